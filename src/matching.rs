//! Matching engine: turns one command into exec and market-data events.
//!
//! Owns the book and the producer ends of the two output queues. Every
//! command ends with a top-of-book publish, so the last market-data event
//! attributable to a command is always the fresh top. Output pushes are
//! best effort: a full queue drops the event rather than blocking the
//! engine thread.

use crate::command::{
    now_ns, CancelOrder, Command, ExecEvent, MarketDataEvent, NewOrder, RejectReason, Tif,
    TopOfBook,
};
use crate::errors::EngineError;
use crate::order_book::OrderBook;
use crate::spsc::Producer;

/// The matching core. Single-threaded by construction: exactly one thread
/// owns a `MatchingEngine` and with it the book.
pub struct MatchingEngine<const N: usize> {
    book: OrderBook,
    exec_out: Producer<ExecEvent, N>,
    md_out: Producer<MarketDataEvent, N>,
}

impl<const N: usize> MatchingEngine<N> {
    pub fn new(exec_out: Producer<ExecEvent, N>, md_out: Producer<MarketDataEvent, N>) -> Self {
        Self {
            book: OrderBook::new(),
            exec_out,
            md_out,
        }
    }

    #[inline]
    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    #[inline]
    pub fn book_mut(&mut self) -> &mut OrderBook {
        &mut self.book
    }

    /// Current top of book, read on the owning thread.
    #[inline]
    pub fn top_snapshot(&self) -> TopOfBook {
        self.book.top()
    }

    /// Publish the current top on the market-data queue.
    pub fn publish_top(&mut self) {
        let top = self.book.top();
        let _ = self.md_out.push(MarketDataEvent::Top(top));
    }

    /// Apply one command to the book. `Err` means a broken invariant;
    /// the caller must halt rather than keep mutating a corrupt book.
    pub fn on_command(&mut self, cmd: &Command) -> Result<(), EngineError> {
        match cmd {
            Command::New(n) => self.handle_new(*n),
            Command::Cancel(c) => self.handle_cancel(c),
        }
    }

    fn send_exec(&mut self, event: ExecEvent) {
        let _ = self.exec_out.push(event);
    }

    fn handle_cancel(&mut self, cxl: &CancelOrder) -> Result<(), EngineError> {
        let canceled = self.book.cancel(cxl.order_id)?;
        let event = if canceled > 0 {
            ExecEvent::cancel_ack(cxl.order_id, cxl.user_id, now_ns())
        } else {
            ExecEvent::reject(
                cxl.order_id,
                cxl.user_id,
                RejectReason::UnknownOrderId,
                now_ns(),
            )
        };
        self.send_exec(event);
        self.publish_top();
        Ok(())
    }

    fn handle_new(&mut self, mut n: NewOrder) -> Result<(), EngineError> {
        if n.ts_ns == 0 {
            n.ts_ns = now_ns();
        }

        if n.qty <= 0 {
            self.send_exec(ExecEvent::reject(
                n.order_id,
                n.user_id,
                RejectReason::InvalidQuantity,
                now_ns(),
            ));
            self.publish_top();
            return Ok(());
        }

        // FOK feasibility check before any mutation: either the whole
        // order fills below, or nothing happens at all.
        if n.tif == Tif::Fok && self.book.fillable_qty(&n) < n.qty {
            self.send_exec(ExecEvent::reject(
                n.order_id,
                n.user_id,
                RejectReason::FokNotFilled,
                now_ns(),
            ));
            self.publish_top();
            return Ok(());
        }

        let Self {
            book,
            exec_out,
            md_out,
        } = &mut *self;

        let mut leaves = n.qty;
        let remaining = book.match_order(&n, |price, qty, _resting| {
            leaves -= qty;
            let ts_ns = now_ns();
            // Trade exec and trade print share a timestamp so consumers
            // can correlate across the two queues.
            let _ = exec_out.push(ExecEvent::trade(
                n.order_id, n.user_id, qty, price, leaves, ts_ns,
            ));
            let _ = md_out.push(MarketDataEvent::Trade(crate::command::TradePrint {
                price,
                qty,
                aggressor: n.side,
                ts_ns,
            }));
        });

        if remaining > 0 {
            match n.tif {
                Tif::Day => {
                    let mut residue = n;
                    residue.qty = remaining;
                    book.add_passive(&residue)?;
                    let _ = exec_out.push(ExecEvent::ack(n.order_id, n.user_id, remaining, now_ns()));
                }
                Tif::Ioc => {
                    let _ = exec_out.push(ExecEvent::ack(n.order_id, n.user_id, 0, now_ns()));
                }
                Tif::Fok => {
                    return Err(EngineError::FokResidue {
                        order_id: n.order_id,
                        remaining,
                    });
                }
            }
        } else {
            let _ = exec_out.push(ExecEvent::ack(n.order_id, n.user_id, 0, now_ns()));
        }

        let _ = md_out.push(MarketDataEvent::Top(book.top()));
        Ok(())
    }
}
