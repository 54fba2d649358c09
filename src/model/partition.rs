//! Numbers at age for every category.
//!
//! Ages run `min_age..=max_age`; with a plus group the last age also holds
//! every older fish.

#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    categories: Vec<String>,
    min_age: u32,
    max_age: u32,
    plus_group: bool,
    numbers: Vec<Vec<f64>>,
}

impl Partition {
    /// Empty partition. Callers guarantee `min_age <= max_age`.
    pub fn new(categories: Vec<String>, min_age: u32, max_age: u32, plus_group: bool) -> Partition {
        let width = (max_age.saturating_sub(min_age) + 1) as usize;
        let numbers = vec![vec![0.0; width]; categories.len()];
        Partition { categories, min_age, max_age, plus_group, numbers }
    }

    /// Zero every cell.
    pub fn reset(&mut self) {
        for row in &mut self.numbers {
            row.fill(0.0);
        }
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn category_index(&self, label: &str) -> Option<usize> {
        self.categories.iter().position(|c| c == label)
    }

    pub fn min_age(&self) -> u32 {
        self.min_age
    }

    pub fn max_age(&self) -> u32 {
        self.max_age
    }

    pub fn plus_group(&self) -> bool {
        self.plus_group
    }

    pub fn age_count(&self) -> usize {
        (self.max_age - self.min_age + 1) as usize
    }

    pub fn age_index(&self, age: u32) -> Option<usize> {
        (self.min_age..=self.max_age).contains(&age).then(|| (age - self.min_age) as usize)
    }

    /// Ages in column order.
    pub fn ages(&self) -> impl Iterator<Item = u32> {
        self.min_age..=self.max_age
    }

    pub fn numbers(&self, category: usize) -> &[f64] {
        &self.numbers[category]
    }

    pub fn numbers_mut(&mut self, category: usize) -> &mut [f64] {
        &mut self.numbers[category]
    }

    pub fn total(&self, category: usize) -> f64 {
        self.numbers[category].iter().sum()
    }

    pub fn is_finite(&self) -> bool {
        self.numbers.iter().flatten().all(|n| n.is_finite())
    }

    /// Move every category one age older.
    ///
    /// With a plus group the oldest age keeps its fish and receives the next
    /// youngest; without one the oldest age leaves the partition.
    pub fn age_by_one(&mut self, category: usize) {
        let row = &mut self.numbers[category];
        let Some(last) = row.len().checked_sub(1) else {
            return;
        };
        if last == 0 {
            if !self.plus_group {
                row[0] = 0.0;
            }
            return;
        }
        let oldest = if self.plus_group { row[last] + row[last - 1] } else { row[last - 1] };
        for i in (1..last).rev() {
            row[i] = row[i - 1];
        }
        row[last] = oldest;
        row[0] = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partition(plus_group: bool) -> Partition {
        let mut p = Partition::new(vec!["stock".to_string()], 1, 4, plus_group);
        p.numbers_mut(0).copy_from_slice(&[10.0, 8.0, 6.0, 4.0]);
        p
    }

    #[test]
    // Purpose
    // -------
    // Ageing with a plus group keeps the total and accumulates the oldest.
    fn ageing_with_plus_group_accumulates() {
        let mut p = partition(true);

        p.age_by_one(0);

        assert_eq!(p.numbers(0), &[0.0, 10.0, 8.0, 10.0]);
        assert_eq!(p.total(0), 28.0);
    }

    #[test]
    fn ageing_without_plus_group_drops_oldest() {
        let mut p = partition(false);

        p.age_by_one(0);

        assert_eq!(p.numbers(0), &[0.0, 10.0, 8.0, 6.0]);
    }

    #[test]
    fn age_index_is_relative_to_min_age() {
        let p = partition(true);

        assert_eq!(p.age_count(), 4);
        assert_eq!(p.age_index(1), Some(0));
        assert_eq!(p.age_index(4), Some(3));
        assert_eq!(p.age_index(0), None);
        assert_eq!(p.age_index(5), None);
    }

    #[test]
    fn reset_zeroes_and_finiteness_is_checked() {
        let mut p = partition(true);
        p.numbers_mut(0)[2] = f64::NAN;
        assert!(!p.is_finite());

        p.reset();

        assert!(p.is_finite());
        assert_eq!(p.total(0), 0.0);
    }
}
