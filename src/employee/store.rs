//! In-memory employee store.

use parking_lot::RwLock;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};
use uuid::Uuid;

use super::model::{email_for, CreateEmployeeInput, Employee};

const FIRST_NAMES: &[&str] = &[
    "Ada", "Alan", "Barbara", "Claude", "Donald", "Edsger", "Frances", "Grace", "Jean", "John",
    "Ken", "Leslie", "Margaret", "Niklaus", "Radia", "Tony",
];

const LAST_NAMES: &[&str] = &[
    "Allen", "Backus", "Hamilton", "Hoare", "Hopper", "Kernighan", "Knuth", "Lamport", "Liskov",
    "Lovelace", "Perlman", "Ritchie", "Sammet", "Shannon", "Turing", "Wirth",
];

const TITLES: &[&str] = &[
    "Software Engineer",
    "Senior Software Engineer",
    "Engineering Manager",
    "Product Manager",
    "Data Analyst",
    "Site Reliability Engineer",
    "Designer",
    "Technical Writer",
];

/// Thread-safe employee storage.
#[derive(Debug, Default)]
pub struct EmployeeStore {
    employees: RwLock<Vec<Employee>>,
}

impl EmployeeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `count` randomly generated employees.
    pub fn seeded(count: usize) -> Self {
        let mut rng = rand::thread_rng();
        let employees = (0..count)
            .map(|_| {
                let first = FIRST_NAMES.choose(&mut rng).copied().unwrap_or("Ada");
                let last = LAST_NAMES.choose(&mut rng).copied().unwrap_or("Lovelace");
                let name = format!("{} {}", first, last);
                Employee {
                    id: Uuid::new_v4(),
                    employee_email: email_for(&name),
                    employee_name: name,
                    employee_salary: rng.gen_range(30_000..=400_000),
                    employee_age: rng.gen_range(16..=75),
                    employee_title: TITLES.choose(&mut rng).copied().unwrap_or("Engineer").to_string(),
                }
            })
            .collect();

        info!(count = count, "Seeded employee store");
        Self {
            employees: RwLock::new(employees),
        }
    }

    /// All employees.
    pub fn list(&self) -> Vec<Employee> {
        self.employees.read().clone()
    }

    /// Look up an employee by id.
    pub fn get(&self, id: &Uuid) -> Option<Employee> {
        self.employees.read().iter().find(|e| &e.id == id).cloned()
    }

    /// Store a new employee built from a validated input.
    pub fn create(&self, input: &CreateEmployeeInput) -> Employee {
        let name = input.name.trim().to_string();
        let employee = Employee {
            id: Uuid::new_v4(),
            employee_email: email_for(&name),
            employee_name: name,
            employee_salary: input.salary.and_then(|s| u32::try_from(s).ok()).unwrap_or_default(),
            employee_age: input.age.and_then(|a| u32::try_from(a).ok()).unwrap_or_default(),
            employee_title: input.title.trim().to_string(),
        };

        debug!(id = %employee.id, "Created employee");
        self.employees.write().push(employee.clone());
        employee
    }

    /// Employees whose name contains `fragment`, ignoring case.
    pub fn search_by_name(&self, fragment: &str) -> Vec<Employee> {
        let needle = fragment.trim().to_lowercase();
        self.employees
            .read()
            .iter()
            .filter(|e| e.employee_name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// The highest salary on record, or zero for an empty store.
    pub fn highest_salary(&self) -> u32 {
        self.employees
            .read()
            .iter()
            .map(|e| e.employee_salary)
            .max()
            .unwrap_or_default()
    }

    /// Names of the `limit` best paid employees, highest salary first.
    pub fn top_earner_names(&self, limit: usize) -> Vec<String> {
        let mut employees = self.list();
        employees.sort_by(|a, b| b.employee_salary.cmp(&a.employee_salary));
        employees
            .into_iter()
            .take(limit)
            .map(|e| e.employee_name)
            .collect()
    }

    /// Remove an employee by id, returning it if it existed.
    pub fn delete_by_id(&self, id: &Uuid) -> Option<Employee> {
        let mut employees = self.employees.write();
        let index = employees.iter().position(|e| &e.id == id)?;
        let removed = employees.remove(index);
        debug!(id = %removed.id, "Deleted employee");
        Some(removed)
    }

    /// Remove the first employee with the given name.
    ///
    /// Returns `true` if an employee was removed.
    pub fn delete_by_name(&self, name: &str) -> bool {
        let mut employees = self.employees.write();
        match employees.iter().position(|e| e.employee_name == name) {
            Some(index) => {
                let removed = employees.remove(index);
                debug!(id = %removed.id, "Deleted employee");
                true
            }
            None => false,
        }
    }

    /// Number of stored employees.
    pub fn len(&self) -> usize {
        self.employees.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.employees.read().is_empty()
    }
}
