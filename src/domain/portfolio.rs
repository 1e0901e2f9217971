//! Single-position account: cash, one all-in long position, trade history and
//! the daily equity curve.
//!
//! The portfolio is either FLAT (`shares_held == 0`, no open trade) or LONG
//! (`shares_held > 0`, exactly one open trade whose entry price is the
//! position entry price). `buy` moves FLAT → LONG, `sell` moves LONG → FLAT,
//! anything else is refused with a [`TransitionError`] and leaves the
//! portfolio untouched.

use chrono::NaiveDate;

use super::error::TransitionError;

/// Relative slack when comparing an auto-sized order's cost to available cash,
/// so that sizing `cash / price` shares and multiplying back never fails on
/// rounding. Explicit share counts get no slack.
const CASH_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq)]
pub struct OpenTrade {
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub shares: f64,
}

impl OpenTrade {
    fn close(self, exit_date: NaiveDate, exit_price: f64) -> ClosedTrade {
        ClosedTrade {
            entry_date: self.entry_date,
            entry_price: self.entry_price,
            shares: self.shares,
            exit_date,
            exit_price,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClosedTrade {
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub shares: f64,
    pub exit_date: NaiveDate,
    pub exit_price: f64,
}

impl ClosedTrade {
    /// (exit - entry) / entry × 100
    pub fn return_pct(&self) -> f64 {
        (self.exit_price - self.entry_price) / self.entry_price * 100.0
    }

    /// (exit - entry) × shares, before commission.
    pub fn return_dollars(&self) -> f64 {
        (self.exit_price - self.entry_price) * self.shares
    }

    /// Calendar days between entry and exit.
    pub fn holding_days(&self) -> i64 {
        (self.exit_date - self.entry_date).num_days()
    }

    pub fn is_winner(&self) -> bool {
        self.return_pct() > 0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EquitySnapshot {
    pub date: NaiveDate,
    pub portfolio_value: f64,
    pub cash: f64,
    pub position_value: f64,
    pub shares_held: f64,
}

/// An executed buy or sell.
#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
    pub date: NaiveDate,
    pub price: f64,
    pub shares: f64,
    pub commission: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    starting_capital: f64,
    cash: f64,
    commission_pct: f64,
    shares_held: f64,
    open_trade: Option<OpenTrade>,
    closed_trades: Vec<ClosedTrade>,
    equity_curve: Vec<EquitySnapshot>,
}

impl Portfolio {
    /// `commission_pct` is a fraction of notional: 0.001 = 0.1%.
    pub fn new(starting_capital: f64, commission_pct: f64) -> Self {
        Portfolio {
            starting_capital,
            cash: starting_capital,
            commission_pct,
            shares_held: 0.0,
            open_trade: None,
            closed_trades: Vec::new(),
            equity_curve: Vec::new(),
        }
    }

    pub fn starting_capital(&self) -> f64 {
        self.starting_capital
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn commission_pct(&self) -> f64 {
        self.commission_pct
    }

    pub fn shares_held(&self) -> f64 {
        self.shares_held
    }

    pub fn has_position(&self) -> bool {
        self.shares_held > 0.0
    }

    pub fn open_trade(&self) -> Option<&OpenTrade> {
        self.open_trade.as_ref()
    }

    /// Entry price of the open position, if any.
    pub fn position_entry_price(&self) -> Option<f64> {
        self.open_trade.as_ref().map(|t| t.entry_price)
    }

    pub fn closed_trades(&self) -> &[ClosedTrade] {
        &self.closed_trades
    }

    pub fn equity_curve(&self) -> &[EquitySnapshot] {
        &self.equity_curve
    }

    pub fn position_value(&self, price: f64) -> f64 {
        self.shares_held * price
    }

    pub fn total_value(&self, price: f64) -> f64 {
        self.cash + self.position_value(price)
    }

    /// Opens a long position at `price`. With `shares == None` the order is
    /// sized to spend all cash net of commission.
    pub fn buy(
        &mut self,
        date: NaiveDate,
        price: f64,
        shares: Option<f64>,
    ) -> Result<Fill, TransitionError> {
        if self.has_position() {
            return Err(TransitionError::AlreadyLong);
        }
        if !(price.is_finite() && price > 0.0) {
            return Err(TransitionError::InvalidOrder {
                reason: format!("price must be positive, got {price}"),
            });
        }

        let auto_sized = shares.is_none();
        let shares = shares.unwrap_or(self.cash * (1.0 - self.commission_pct) / price);
        if !(shares.is_finite() && shares > 0.0) {
            return Err(TransitionError::InvalidOrder {
                reason: format!("share count must be positive, got {shares}"),
            });
        }

        let cost = shares * price;
        let commission = cost * self.commission_pct;
        let total_cost = cost + commission;

        let available = if auto_sized {
            self.cash * (1.0 + CASH_TOLERANCE)
        } else {
            self.cash
        };
        if total_cost > available {
            return Err(TransitionError::InsufficientCash {
                required: total_cost,
                available: self.cash,
            });
        }

        self.cash = (self.cash - total_cost).max(0.0);
        self.shares_held = shares;
        self.open_trade = Some(OpenTrade {
            entry_date: date,
            entry_price: price,
            shares,
        });

        Ok(Fill {
            date,
            price,
            shares,
            commission,
        })
    }

    /// Closes the open position at `price`, crediting proceeds net of
    /// commission.
    pub fn sell(&mut self, date: NaiveDate, price: f64) -> Result<Fill, TransitionError> {
        let trade = match self.open_trade.take() {
            Some(trade) if self.has_position() => trade,
            other => {
                self.open_trade = other;
                return Err(TransitionError::NoPosition);
            }
        };

        let shares = self.shares_held;
        let proceeds = shares * price;
        let commission = proceeds * self.commission_pct;

        self.cash += proceeds - commission;
        self.shares_held = 0.0;
        self.closed_trades.push(trade.close(date, price));

        Ok(Fill {
            date,
            price,
            shares,
            commission,
        })
    }

    /// Appends the end-of-day snapshot. Call once per simulated date, after
    /// any buy/sell for that date.
    pub fn record_day(&mut self, date: NaiveDate, price: f64) {
        debug_assert_eq!(self.has_position(), self.open_trade.is_some());

        self.equity_curve.push(EquitySnapshot {
            date,
            portfolio_value: self.total_value(price),
            cash: self.cash,
            position_value: self.position_value(price),
            shares_held: self.shares_held,
        });
    }

    /// Consumes the portfolio, yielding the equity curve and closed trades.
    pub fn into_history(self) -> (Vec<EquitySnapshot>, Vec<ClosedTrade>) {
        (self.equity_curve, self.closed_trades)
    }
}
