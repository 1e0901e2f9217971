//! Per-day trading signals.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Buy => write!(f, "BUY"),
            Signal::Sell => write!(f, "SELL"),
            Signal::Hold => write!(f, "HOLD"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalSummary {
    pub buys: usize,
    pub sells: usize,
    pub holds: usize,
}

impl SignalSummary {
    pub fn of(signals: &[Signal]) -> Self {
        signals
            .iter()
            .fold(SignalSummary::default(), |mut acc, signal| {
                match signal {
                    Signal::Buy => acc.buys += 1,
                    Signal::Sell => acc.sells += 1,
                    Signal::Hold => acc.holds += 1,
                }
                acc
            })
    }

    pub fn total(&self) -> usize {
        self.buys + self.sells + self.holds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(Signal::Buy.to_string(), "BUY");
        assert_eq!(Signal::Sell.to_string(), "SELL");
        assert_eq!(Signal::Hold.to_string(), "HOLD");
    }

    #[test]
    fn summary_counts() {
        let signals = [Signal::Buy, Signal::Hold, Signal::Hold, Signal::Sell, Signal::Hold];
        let summary = SignalSummary::of(&signals);
        assert_eq!(summary.buys, 1);
        assert_eq!(summary.sells, 1);
        assert_eq!(summary.holds, 3);
        assert_eq!(summary.total(), 5);
    }

    #[test]
    fn summary_empty() {
        assert_eq!(SignalSummary::of(&[]).total(), 0);
    }
}
