//! Pure selection helpers shared by the pattern tables and score maps.

/// Return the item with the greatest key, keeping the earliest on ties.
///
/// `Iterator::max_by` keeps the *last* maximum, which would let table order
/// lose to later rules. Keys that compare as unordered (NaN) never win.
pub fn argmax_by<T, I, F>(items: I, mut key: F) -> Option<T>
where
    I: IntoIterator<Item = T>,
    F: FnMut(&T) -> f64,
{
    let mut best: Option<(T, f64)> = None;
    for item in items {
        let score = key(&item);
        match &best {
            Some((_, top)) if !(score > *top) => {}
            _ if score.is_nan() => {}
            _ => best = Some((item, score)),
        }
    }
    best.map(|(item, _)| item)
}

/// Accumulates scores per name, remembering first-contribution order.
#[derive(Debug, Clone, Default)]
pub struct Tally {
    entries: Vec<(String, f64)>,
}

impl Tally {
    pub fn add(&mut self, name: &str, amount: f64) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, total)) => *total += amount,
            None => self.entries.push((name.to_string(), amount)),
        }
    }

    pub fn get(&self, name: &str) -> f64 {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map_or(0.0, |(_, total)| *total)
    }

    /// Highest total, earliest contributor on ties.
    pub fn winner(&self) -> Option<&str> {
        argmax_by(self.entries.iter(), |(_, total)| *total).map(|(name, _)| name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argmax_picks_highest() {
        let best = argmax_by([1.0, 5.0, 3.0], |v| *v);
        assert_eq!(best, Some(5.0));
    }

    #[test]
    fn test_argmax_ties_keep_first() {
        let items = [("a", 2.0), ("b", 4.0), ("c", 4.0)];
        let best = argmax_by(items, |(_, s)| *s);
        assert_eq!(best.map(|(n, _)| n), Some("b"));
    }

    #[test]
    fn test_argmax_empty_is_none() {
        let best = argmax_by(Vec::<f64>::new(), |v| *v);
        assert!(best.is_none());
    }

    #[test]
    fn test_argmax_skips_nan() {
        let best = argmax_by([f64::NAN, 1.0], |v| *v);
        assert_eq!(best, Some(1.0));
    }

    #[test]
    fn test_tally_accumulates_and_orders() {
        let mut tally = Tally::default();
        tally.add("api", 5.0);
        tally.add("ui", 8.0);
        tally.add("api", 3.0);
        assert_eq!(tally.get("api"), 8.0);
        assert_eq!(tally.winner(), Some("api"));
        assert_eq!(tally.get("missing"), 0.0);
    }
}
