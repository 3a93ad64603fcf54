//! In-memory `SsotRepository` for testing

#![allow(clippy::unwrap_used)] // Mocks can panic on lock poisoning
#![allow(clippy::arithmetic_side_effects)] // Test counters can overflow
#![allow(clippy::significant_drop_tightening)]

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use crate::error::{DatabaseError, DatabaseOperation, DatabaseResult};
use crate::models::{
    ContactPayload, Member, MemberDirectory, MemberImportSummary, MemberStatistics,
};
use crate::traits::SsotRepository;

type PeopleMap = Arc<Mutex<BTreeMap<String, String>>>;
type UserMap = Arc<Mutex<BTreeMap<String, Member>>>;
type ContactMap = Arc<Mutex<HashMap<String, ContactPayload>>>;

/// Mock repository mirroring the upsert semantics of the Postgres one
#[derive(Clone)]
pub struct MockSsotRepository {
    pub people: PeopleMap,
    pub users: UserMap,
    pub contacts: ContactMap,

    // Behavior controls for testing
    pub should_fail_next: Arc<Mutex<bool>>,
    pub error_message: Arc<Mutex<String>>,
    /// Contact names whose insert always fails
    pub failing_contacts: Arc<Mutex<Vec<String>>>,
}

impl Default for MockSsotRepository {
    fn default() -> Self {
        Self {
            people: Arc::new(Mutex::new(BTreeMap::new())),
            users: Arc::new(Mutex::new(BTreeMap::new())),
            contacts: Arc::new(Mutex::new(HashMap::new())),
            should_fail_next: Arc::new(Mutex::new(false)),
            error_message: Arc::new(Mutex::new("Mock error".to_string())),
            failing_contacts: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl MockSsotRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure to fail on next operation
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned
    pub fn fail_next(&self, message: &str) {
        *self.should_fail_next.lock().unwrap() = true;
        *self.error_message.lock().unwrap() = message.to_string();
    }

    /// Make every insert of a contact with this name fail
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned
    pub fn fail_contact(&self, name: &str) {
        self.failing_contacts.lock().unwrap().push(name.to_string());
    }

    /// Number of stored contacts
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned
    pub fn contact_count(&self) -> usize {
        self.contacts.lock().unwrap().len()
    }

    fn check_fail(&self, operation: DatabaseOperation) -> DatabaseResult<()> {
        let mut should_fail = self.should_fail_next.lock().unwrap();
        if *should_fail {
            *should_fail = false;
            return Err(DatabaseError::UnexpectedState {
                operation: Box::new(operation),
                message: self.error_message.lock().unwrap().clone(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl SsotRepository for MockSsotRepository {
    async fn import_members(
        &self,
        directory: &MemberDirectory,
    ) -> DatabaseResult<MemberImportSummary> {
        self.check_fail(DatabaseOperation::Transaction {
            description: "member import".to_string(),
        })?;

        let people = directory.people();
        let mut stored_people = self.people.lock().unwrap();
        for person in &people {
            stored_people.insert(person.id.clone(), person.name.clone());
        }

        let mut users = self.users.lock().unwrap();
        for member in &directory.members {
            users.insert(member.slack_id.clone(), member.clone());
        }

        Ok(MemberImportSummary {
            people: people.len(),
            accounts: directory.members.len(),
        })
    }

    async fn member_statistics(&self) -> DatabaseResult<MemberStatistics> {
        self.check_fail(DatabaseOperation::ListMultiAccountPeople)?;

        let users = self.users.lock().unwrap();
        let count_status = |status: &str| {
            i64::try_from(users.values().filter(|m| m.status == status).count()).unwrap_or(i64::MAX)
        };

        let mut per_person: BTreeMap<&str, i64> = BTreeMap::new();
        for member in users.values() {
            *per_person.entry(member.person_id.as_str()).or_default() += 1;
        }
        let mut multi_account_people: Vec<(String, i64)> = per_person
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(person, count)| (person.to_string(), count))
            .collect();
        multi_account_people.sort_by(|a, b| b.1.cmp(&a.1));
        multi_account_people.truncate(10);

        Ok(MemberStatistics {
            active: count_status("active"),
            inactive: count_status("inactive"),
            multi_account_people,
        })
    }

    async fn insert_contact(&self, id: &str, payload: &ContactPayload) -> DatabaseResult<bool> {
        let operation = DatabaseOperation::InsertContact { id: id.to_string() };
        self.check_fail(operation.clone())?;

        let name = payload.name().unwrap_or_default();
        if self.failing_contacts.lock().unwrap().iter().any(|n| n == name) {
            return Err(DatabaseError::UnexpectedState {
                operation: Box::new(operation),
                message: format!("insert rejected for {name}"),
            });
        }

        let mut contacts = self.contacts.lock().unwrap();
        if contacts.contains_key(id) {
            return Ok(false);
        }
        contacts.insert(id.to_string(), payload.clone());
        Ok(true)
    }
}
