use std::collections::HashSet;

use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::debug;

use crate::{Employee, EmployeeId, EmployeePatch, HrError, HrResult, NewEmployee};

const RANDOM_DRAW_ATTEMPTS: usize = 32;

/// How the store hands out ids for new records.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IdStrategy {
    /// Monotonic counter starting at 1.
    #[default]
    Sequential,
    /// Uniform draw from `0..max`, re-drawn on collision.
    Random { max: EmployeeId },
}

/// Authoritative ordered collection of employee records.
///
/// Iteration order is insertion order. Ids are unique for the lifetime of
/// the store, or until [`EmployeeStore::reset`].
#[derive(Debug)]
pub struct EmployeeStore {
    records: Vec<Employee>,
    strategy: IdStrategy,
    next_id: EmployeeId,
    rng: StdRng,
}

impl Default for EmployeeStore {
    fn default() -> Self {
        Self::new(IdStrategy::default())
    }
}

impl EmployeeStore {
    pub fn new(strategy: IdStrategy) -> Self {
        Self::with_rng(strategy, StdRng::from_entropy())
    }

    /// Store with a fixed RNG seed, so random ids are reproducible.
    pub fn seeded(strategy: IdStrategy, seed: u64) -> Self {
        Self::with_rng(strategy, StdRng::seed_from_u64(seed))
    }

    fn with_rng(strategy: IdStrategy, rng: StdRng) -> Self {
        Self {
            records: Vec::new(),
            strategy,
            next_id: 1,
            rng,
        }
    }

    pub fn list(&self) -> Vec<Employee> {
        self.records.clone()
    }

    pub fn get(&self, id: EmployeeId) -> Option<&Employee> {
        self.records.iter().find(|employee| employee.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn insert(&mut self, fields: NewEmployee) -> HrResult<Employee> {
        let id = self.allocate_id()?;
        let employee = Employee {
            id,
            name: fields.name,
            email: fields.email,
        };
        self.records.push(employee.clone());
        debug!(id, total = self.records.len(), "employee inserted");
        Ok(employee)
    }

    pub fn update(&mut self, id: EmployeeId, patch: EmployeePatch) -> HrResult<Employee> {
        let employee = self
            .records
            .iter_mut()
            .find(|employee| employee.id == id)
            .ok_or(HrError::NotFound(id))?;
        employee.apply(patch);
        debug!(id, "employee updated");
        Ok(employee.clone())
    }

    pub fn remove(&mut self, id: EmployeeId) -> bool {
        let Some(index) = self.records.iter().position(|employee| employee.id == id) else {
            return false;
        };
        self.records.remove(index);
        debug!(id, total = self.records.len(), "employee removed");
        true
    }

    /// Insert every record in order, stopping at the first failure.
    pub fn seed(&mut self, records: impl IntoIterator<Item = NewEmployee>) -> HrResult<Vec<Employee>> {
        records.into_iter().map(|fields| self.insert(fields)).collect()
    }

    pub fn with_demo_data(mut self) -> HrResult<Self> {
        self.seed(crate::demo_employees())?;
        Ok(self)
    }

    /// Drop every record and restart id assignment.
    pub fn reset(&mut self) {
        self.records.clear();
        self.next_id = 1;
        debug!("employee store reset");
    }

    fn allocate_id(&mut self) -> HrResult<EmployeeId> {
        match self.strategy {
            IdStrategy::Sequential => {
                let id = self.next_id;
                self.next_id += 1;
                Ok(id)
            }
            IdStrategy::Random { max } => self.draw_unused(max),
        }
    }

    fn draw_unused(&mut self, max: EmployeeId) -> HrResult<EmployeeId> {
        let taken: HashSet<EmployeeId> = self.records.iter().map(|employee| employee.id).collect();
        if max == 0 || taken.len() as u64 >= max {
            return Err(HrError::IdSpaceExhausted(max));
        }
        for _ in 0..RANDOM_DRAW_ATTEMPTS {
            let candidate = self.rng.gen_range(0..max);
            if !taken.contains(&candidate) {
                return Ok(candidate);
            }
        }
        // Dense range: pick uniformly among the free ids instead.
        let free: Vec<EmployeeId> = (0..max).filter(|id| !taken.contains(id)).collect();
        if free.is_empty() {
            return Err(HrError::IdSpaceExhausted(max));
        }
        let index = self.rng.gen_range(0..free.len());
        Ok(free[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_records() -> EmployeeStore {
        let mut store = EmployeeStore::default();
        store
            .seed([
                NewEmployee::new("One", "one@example.com"),
                NewEmployee::new("Two", "two@example.com"),
                NewEmployee::new("Three", "three@example.com"),
            ])
            .unwrap();
        store
    }

    #[test]
    fn insert_then_list_contains_record() {
        let mut store = EmployeeStore::default();
        let created = store.insert(NewEmployee::new("Ann", "ann@x.com")).unwrap();
        let listed = store.list();
        let matches: Vec<_> = listed
            .iter()
            .filter(|e| e.name == "Ann" && e.email == "ann@x.com")
            .collect();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, created.id);
    }

    #[test]
    fn list_keeps_insertion_order() {
        let store = three_records();
        let names: Vec<_> = store.list().into_iter().map(|e| e.name).collect();
        assert_eq!(names, ["One", "Two", "Three"]);
    }

    #[test]
    fn update_merges_partial_fields() {
        let mut store = EmployeeStore::default().with_demo_data().unwrap();
        let updated = store
            .update(1, EmployeePatch::default().name("Johnny"))
            .unwrap();
        assert_eq!(
            updated,
            Employee {
                id: 1,
                name: "Johnny".into(),
                email: "john@example.com".into(),
            }
        );
        assert_eq!(store.get(1), Some(&updated));
    }

    #[test]
    fn update_unknown_id_is_not_found() {
        let mut store = three_records();
        let err = store
            .update(99, EmployeePatch::default().name("X"))
            .unwrap_err();
        assert_eq!(err, HrError::NotFound(99));
    }

    #[test]
    fn remove_deletes_exactly_one() {
        let mut store = three_records();
        assert!(store.remove(2));
        let ids: Vec<_> = store.list().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, [1, 3]);

        assert!(!store.remove(99));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn sequential_ids_are_not_reused_after_remove() {
        let mut store = three_records();
        store.remove(3);
        let created = store.insert(NewEmployee::new("Four", "four@example.com")).unwrap();
        assert_eq!(created.id, 4);
    }

    #[test]
    fn random_ids_stay_unique_across_the_whole_range() {
        let mut store = EmployeeStore::seeded(IdStrategy::Random { max: 50 }, 7);
        for n in 0..50 {
            store
                .insert(NewEmployee::new(format!("e{n}"), "e@example.com"))
                .unwrap();
        }
        let ids: HashSet<_> = store.list().into_iter().map(|e| e.id).collect();
        assert_eq!(ids.len(), 50);
        assert!(ids.iter().all(|id| *id < 50));

        let err = store
            .insert(NewEmployee::new("overflow", "o@example.com"))
            .unwrap_err();
        assert_eq!(err, HrError::IdSpaceExhausted(50));
    }

    #[test]
    fn default_store_counts_from_one() {
        assert_eq!(IdStrategy::default(), IdStrategy::Sequential);
        let mut store = EmployeeStore::default();
        let first = store.insert(NewEmployee::new("First", "f@example.com")).unwrap();
        assert_eq!(first.id, 1);
    }

    #[test]
    fn reset_clears_records_and_restarts_ids() {
        let mut store = three_records();
        store.reset();
        assert!(store.is_empty());
        let created = store.insert(NewEmployee::new("Again", "a@example.com")).unwrap();
        assert_eq!(created.id, 1);
    }
}
