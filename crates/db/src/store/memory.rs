//! In-process [`SchoolStore`] for tests and local runs without PostgreSQL.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use campus_core::enrollment::{decrement_enrollment, duplicate_enrollment_message};
use campus_core::types::DbId;
use chrono::Utc;
use sqlx::types::Json;
use tokio::sync::Mutex;

use super::{SchoolStore, StoreError, StoreResult};
use crate::models::class::{Class, CreateClass};
use crate::models::enrollment::{CreateEnrollment, Enrollment, EnrollmentDetail, NewTransfer};
use crate::models::status::EnrollmentStatus;
use crate::models::student::{CreateStudent, Student};
use crate::models::transfer_log::{CreateTransferLog, TransferLog};

#[derive(Default)]
struct Tables {
    students: BTreeMap<DbId, Student>,
    classes: BTreeMap<DbId, Class>,
    enrollments: BTreeMap<DbId, Enrollment>,
    transfer_logs: Vec<TransferLog>,
    next_student_id: DbId,
    next_class_id: DbId,
    next_enrollment_id: DbId,
    next_transfer_log_id: DbId,
}

fn next_id(counter: &mut DbId) -> DbId {
    *counter += 1;
    *counter
}

impl Tables {
    fn holds_seat(&self, student_id: DbId, class_id: DbId) -> bool {
        self.enrollments
            .values()
            .any(|e| e.student_id == student_id && e.class_id == class_id)
    }

    fn class_mut(&mut self, id: DbId) -> StoreResult<&mut Class> {
        self.classes
            .get_mut(&id)
            .ok_or(StoreError::NotFound { entity: "Class", id })
    }

    fn take_seat(&mut self, class_id: DbId) -> StoreResult<()> {
        let class = self.class_mut(class_id)?;
        if class.current_enrollment >= class.capacity {
            return Err(StoreError::CapacityExceeded { class_id });
        }
        class.current_enrollment += 1;
        class.updated_at = Utc::now();
        Ok(())
    }

    fn free_seat(&mut self, class_id: DbId) {
        if let Some(class) = self.classes.get_mut(&class_id) {
            class.current_enrollment = decrement_enrollment(class.current_enrollment);
            class.updated_at = Utc::now();
        }
    }
}

/// A [`SchoolStore`] holding every table in one mutex-guarded map set.
///
/// Each operation holds the lock for its whole duration, which gives the
/// same atomicity as the PostgreSQL transactions.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_transfer_logs: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent transfer-log write fail, as if the table were missing.
    pub fn set_fail_transfer_logs(&self, fail: bool) {
        self.fail_transfer_logs.store(fail, Ordering::SeqCst);
    }

    /// Every transfer log recorded so far, oldest first.
    pub async fn transfer_logs(&self) -> Vec<TransferLog> {
        self.tables.lock().await.transfer_logs.clone()
    }
}

#[async_trait]
impl SchoolStore for MemoryStore {
    async fn create_student(&self, input: &CreateStudent) -> StoreResult<Student> {
        let mut tables = self.tables.lock().await;
        let now = Utc::now();
        let student = Student {
            id: next_id(&mut tables.next_student_id),
            first_name: input.first_name.clone(),
            last_name: input.last_name.clone(),
            email: input.email.clone(),
            grade_level: input.grade_level,
            created_at: now,
            updated_at: now,
        };
        tables.students.insert(student.id, student.clone());
        Ok(student)
    }

    async fn find_student(&self, id: DbId) -> StoreResult<Option<Student>> {
        Ok(self.tables.lock().await.students.get(&id).cloned())
    }

    async fn create_class(&self, input: &CreateClass) -> StoreResult<Class> {
        let mut tables = self.tables.lock().await;

        if let Some(code) = &input.code {
            if tables.classes.values().any(|c| c.code.as_ref() == Some(code)) {
                return Err(StoreError::Conflict(
                    "Duplicate value violates unique constraint: uq_classes_code".into(),
                ));
            }
        }

        let now = Utc::now();
        let class = Class {
            id: next_id(&mut tables.next_class_id),
            name: input.name.clone(),
            code: input.code.clone(),
            capacity: input.capacity,
            current_enrollment: 0,
            created_at: now,
            updated_at: now,
        };
        tables.classes.insert(class.id, class.clone());
        Ok(class)
    }

    async fn find_class(&self, id: DbId) -> StoreResult<Option<Class>> {
        Ok(self.tables.lock().await.classes.get(&id).cloned())
    }

    async fn list_classes(&self, limit: i64, offset: i64) -> StoreResult<Vec<Class>> {
        let tables = self.tables.lock().await;
        let mut classes: Vec<Class> = tables.classes.values().cloned().collect();
        classes.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(classes
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(0))
            .take(usize::try_from(limit).unwrap_or(0))
            .collect())
    }

    async fn enroll(&self, input: &CreateEnrollment) -> StoreResult<Enrollment> {
        let mut tables = self.tables.lock().await;

        if !tables.students.contains_key(&input.student_id) {
            return Err(StoreError::NotFound {
                entity: "Student",
                id: input.student_id,
            });
        }
        if !tables.classes.contains_key(&input.class_id) {
            return Err(StoreError::NotFound {
                entity: "Class",
                id: input.class_id,
            });
        }
        if tables.holds_seat(input.student_id, input.class_id) {
            return Err(StoreError::Conflict(duplicate_enrollment_message(
                input.student_id,
                input.class_id,
            )));
        }

        tables.take_seat(input.class_id)?;

        let now = Utc::now();
        let enrollment = Enrollment {
            id: next_id(&mut tables.next_enrollment_id),
            student_id: input.student_id,
            class_id: input.class_id,
            status_id: input.status_id.unwrap_or(EnrollmentStatus::Active.id()),
            enrolled_at: now,
            steps: Json(input.steps.clone()),
            created_at: now,
            updated_at: now,
        };
        tables.enrollments.insert(enrollment.id, enrollment.clone());
        Ok(enrollment)
    }

    async fn find_enrollment(&self, id: DbId) -> StoreResult<Option<Enrollment>> {
        Ok(self.tables.lock().await.enrollments.get(&id).cloned())
    }

    async fn find_enrollment_for_student_in_class(
        &self,
        student_id: DbId,
        class_id: DbId,
    ) -> StoreResult<Option<Enrollment>> {
        Ok(self
            .tables
            .lock()
            .await
            .enrollments
            .values()
            .find(|e| e.student_id == student_id && e.class_id == class_id)
            .cloned())
    }

    async fn list_enrollments_for_class(&self, class_id: DbId) -> StoreResult<Vec<Enrollment>> {
        let tables = self.tables.lock().await;
        let mut enrollments: Vec<Enrollment> = tables
            .enrollments
            .values()
            .filter(|e| e.class_id == class_id)
            .cloned()
            .collect();
        enrollments.sort_by(|a, b| a.enrolled_at.cmp(&b.enrolled_at).then(a.id.cmp(&b.id)));
        Ok(enrollments)
    }

    async fn find_enrollment_detail(&self, id: DbId) -> StoreResult<Option<EnrollmentDetail>> {
        let tables = self.tables.lock().await;
        let Some(enrollment) = tables.enrollments.get(&id).cloned() else {
            return Ok(None);
        };

        let student = tables
            .students
            .get(&enrollment.student_id)
            .cloned()
            .ok_or(StoreError::NotFound {
                entity: "Student",
                id: enrollment.student_id,
            })?;
        let status = EnrollmentStatus::from_id(enrollment.status_id)
            .ok_or(StoreError::NotFound {
                entity: "EnrollmentStatus",
                id: DbId::from(enrollment.status_id),
            })?
            .info();

        Ok(Some(EnrollmentDetail {
            enrollment,
            student,
            status,
        }))
    }

    async fn withdraw_enrollment(&self, id: DbId) -> StoreResult<bool> {
        let mut tables = self.tables.lock().await;
        let Some(enrollment) = tables.enrollments.remove(&id) else {
            return Ok(false);
        };
        tables.free_seat(enrollment.class_id);
        Ok(true)
    }

    async fn apply_transfer(&self, transfer: &NewTransfer) -> StoreResult<Enrollment> {
        let mut tables = self.tables.lock().await;

        let source = tables
            .enrollments
            .get(&transfer.source_enrollment_id)
            .cloned()
            .ok_or(StoreError::NotFound {
                entity: "Enrollment",
                id: transfer.source_enrollment_id,
            })?;

        if source.class_id != transfer.from_class_id || source.student_id != transfer.student_id {
            return Err(StoreError::Conflict(format!(
                "Enrollment {} changed while the transfer was in progress",
                source.id
            )));
        }
        if tables.holds_seat(source.student_id, transfer.to_class_id) {
            return Err(StoreError::Conflict(duplicate_enrollment_message(
                source.student_id,
                transfer.to_class_id,
            )));
        }

        // Nothing has been written yet if the target is missing or full.
        tables.take_seat(transfer.to_class_id)?;

        let now = Utc::now();
        let created = Enrollment {
            id: next_id(&mut tables.next_enrollment_id),
            student_id: source.student_id,
            class_id: transfer.to_class_id,
            status_id: transfer.status_id,
            enrolled_at: transfer.enrolled_at,
            steps: Json(transfer.steps.clone()),
            created_at: now,
            updated_at: now,
        };
        tables.enrollments.insert(created.id, created.clone());
        tables.enrollments.remove(&source.id);
        tables.free_seat(source.class_id);

        Ok(created)
    }

    async fn create_transfer_log(&self, input: &CreateTransferLog) -> StoreResult<TransferLog> {
        if self.fail_transfer_logs.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "transfer_logs collection is not available".into(),
            ));
        }

        let mut tables = self.tables.lock().await;
        let log = TransferLog {
            id: next_id(&mut tables.next_transfer_log_id),
            previous_enrollment_id: input.previous_enrollment_id,
            new_enrollment_id: input.new_enrollment_id,
            student_id: input.student_id,
            from_class_id: input.from_class_id,
            to_class_id: input.to_class_id,
            reason: input.reason.clone(),
            preserve_progress: input.preserve_progress,
            transferred_by: input.transferred_by,
            created_at: Utc::now(),
        };
        tables.transfer_logs.push(log.clone());
        Ok(log)
    }

    async fn list_transfer_logs_for_student(
        &self,
        student_id: DbId,
    ) -> StoreResult<Vec<TransferLog>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .transfer_logs
            .iter()
            .rev()
            .filter(|log| log.student_id == student_id)
            .cloned()
            .collect())
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use campus_core::enrollment::ProgressStep;

    use super::*;

    fn student() -> CreateStudent {
        CreateStudent {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: None,
            grade_level: Some(9),
        }
    }

    fn class(name: &str, capacity: i32) -> CreateClass {
        CreateClass {
            name: name.into(),
            code: None,
            capacity,
        }
    }

    fn enrollment(student_id: DbId, class_id: DbId) -> CreateEnrollment {
        CreateEnrollment {
            student_id,
            class_id,
            status_id: None,
            steps: vec![ProgressStep {
                name: "orientation".into(),
                completed: true,
                completed_at: None,
            }],
        }
    }

    fn transfer_of(e: &Enrollment, to_class_id: DbId) -> NewTransfer {
        NewTransfer {
            source_enrollment_id: e.id,
            student_id: e.student_id,
            from_class_id: e.class_id,
            to_class_id,
            status_id: e.status_id,
            steps: e.steps.0.clone(),
            enrolled_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn enroll_takes_a_seat_and_defaults_to_active() {
        let store = MemoryStore::new();
        let s = store.create_student(&student()).await.unwrap();
        let c = store.create_class(&class("Algebra", 2)).await.unwrap();

        let e = store.enroll(&enrollment(s.id, c.id)).await.unwrap();

        assert_eq!(e.status_id, EnrollmentStatus::Active.id());
        let c = store.find_class(c.id).await.unwrap().unwrap();
        assert_eq!(c.current_enrollment, 1);
    }

    #[tokio::test]
    async fn enroll_twice_in_same_class_conflicts() {
        let store = MemoryStore::new();
        let s = store.create_student(&student()).await.unwrap();
        let c = store.create_class(&class("Algebra", 5)).await.unwrap();
        store.enroll(&enrollment(s.id, c.id)).await.unwrap();

        let result = store.enroll(&enrollment(s.id, c.id)).await;
        assert_matches!(result, Err(StoreError::Conflict(_)));
        let c = store.find_class(c.id).await.unwrap().unwrap();
        assert_eq!(c.current_enrollment, 1);
    }

    #[tokio::test]
    async fn enroll_into_full_class_is_rejected() {
        let store = MemoryStore::new();
        let a = store.create_student(&student()).await.unwrap();
        let b = store.create_student(&student()).await.unwrap();
        let c = store.create_class(&class("Tiny", 1)).await.unwrap();
        store.enroll(&enrollment(a.id, c.id)).await.unwrap();

        let result = store.enroll(&enrollment(b.id, c.id)).await;
        assert_matches!(result, Err(StoreError::CapacityExceeded { class_id }) if class_id == c.id);
    }

    #[tokio::test]
    async fn enroll_unknown_student_is_not_found() {
        let store = MemoryStore::new();
        let c = store.create_class(&class("Algebra", 5)).await.unwrap();
        let result = store.enroll(&enrollment(99, c.id)).await;
        assert_matches!(result, Err(StoreError::NotFound { entity: "Student", id: 99 }));
    }

    #[tokio::test]
    async fn duplicate_class_code_conflicts() {
        let store = MemoryStore::new();
        let mut input = class("Algebra", 5);
        input.code = Some("MATH-101".into());
        store.create_class(&input).await.unwrap();
        assert_matches!(store.create_class(&input).await, Err(StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn withdraw_frees_seat_and_floors_at_zero() {
        let store = MemoryStore::new();
        let s = store.create_student(&student()).await.unwrap();
        let c = store.create_class(&class("Algebra", 5)).await.unwrap();
        let e = store.enroll(&enrollment(s.id, c.id)).await.unwrap();

        // Counter drifted to zero out of band.
        store.tables.lock().await.classes.get_mut(&c.id).unwrap().current_enrollment = 0;

        assert!(store.withdraw_enrollment(e.id).await.unwrap());
        assert!(!store.withdraw_enrollment(e.id).await.unwrap());
        let c = store.find_class(c.id).await.unwrap().unwrap();
        assert_eq!(c.current_enrollment, 0);
    }

    #[tokio::test]
    async fn apply_transfer_moves_enrollment_and_counters() {
        let store = MemoryStore::new();
        let s = store.create_student(&student()).await.unwrap();
        let from = store.create_class(&class("Algebra", 5)).await.unwrap();
        let to = store.create_class(&class("Geometry", 5)).await.unwrap();
        let e = store.enroll(&enrollment(s.id, from.id)).await.unwrap();

        let created = store.apply_transfer(&transfer_of(&e, to.id)).await.unwrap();

        assert_ne!(created.id, e.id);
        assert_eq!(created.class_id, to.id);
        assert_eq!(created.steps, e.steps);
        assert!(store.find_enrollment(e.id).await.unwrap().is_none());
        assert_eq!(store.find_class(from.id).await.unwrap().unwrap().current_enrollment, 0);
        assert_eq!(store.find_class(to.id).await.unwrap().unwrap().current_enrollment, 1);
    }

    #[tokio::test]
    async fn apply_transfer_floors_source_counter_at_zero() {
        let store = MemoryStore::new();
        let s = store.create_student(&student()).await.unwrap();
        let from = store.create_class(&class("Algebra", 5)).await.unwrap();
        let to = store.create_class(&class("Geometry", 5)).await.unwrap();
        let e = store.enroll(&enrollment(s.id, from.id)).await.unwrap();

        // Counter drifted to zero out of band.
        store.tables.lock().await.classes.get_mut(&from.id).unwrap().current_enrollment = 0;

        store.apply_transfer(&transfer_of(&e, to.id)).await.unwrap();

        assert_eq!(store.find_class(from.id).await.unwrap().unwrap().current_enrollment, 0);
        assert_eq!(store.find_class(to.id).await.unwrap().unwrap().current_enrollment, 1);
    }

    #[tokio::test]
    async fn apply_transfer_into_full_class_writes_nothing() {
        let store = MemoryStore::new();
        let s = store.create_student(&student()).await.unwrap();
        let other = store.create_student(&student()).await.unwrap();
        let from = store.create_class(&class("Algebra", 5)).await.unwrap();
        let to = store.create_class(&class("Geometry", 1)).await.unwrap();
        let e = store.enroll(&enrollment(s.id, from.id)).await.unwrap();
        store.enroll(&enrollment(other.id, to.id)).await.unwrap();

        let result = store.apply_transfer(&transfer_of(&e, to.id)).await;

        assert_matches!(result, Err(StoreError::CapacityExceeded { .. }));
        assert!(store.find_enrollment(e.id).await.unwrap().is_some());
        assert_eq!(store.find_class(from.id).await.unwrap().unwrap().current_enrollment, 1);
        assert_eq!(store.find_class(to.id).await.unwrap().unwrap().current_enrollment, 1);
    }

    #[tokio::test]
    async fn apply_transfer_rejects_stale_source() {
        let store = MemoryStore::new();
        let s = store.create_student(&student()).await.unwrap();
        let from = store.create_class(&class("Algebra", 5)).await.unwrap();
        let to = store.create_class(&class("Geometry", 5)).await.unwrap();
        let e = store.enroll(&enrollment(s.id, from.id)).await.unwrap();
        let plan = transfer_of(&e, to.id);

        store.apply_transfer(&plan).await.unwrap();
        let again = store.apply_transfer(&plan).await;

        assert_matches!(again, Err(StoreError::NotFound { entity: "Enrollment", .. }));
        assert_eq!(store.find_class(to.id).await.unwrap().unwrap().current_enrollment, 1);
    }

    #[tokio::test]
    async fn concurrent_transfers_cannot_overfill_target() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let to = store.create_class(&class("Geometry", 1)).await.unwrap();
        let mut plans = Vec::new();
        for name in ["Algebra", "Biology"] {
            let s = store.create_student(&student()).await.unwrap();
            let from = store.create_class(&class(name, 5)).await.unwrap();
            let e = store.enroll(&enrollment(s.id, from.id)).await.unwrap();
            plans.push(transfer_of(&e, to.id));
        }

        let handles: Vec<_> = plans
            .into_iter()
            .map(|plan| {
                let store = std::sync::Arc::clone(&store);
                tokio::spawn(async move { store.apply_transfer(&plan).await })
            })
            .collect();

        let mut succeeded = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                succeeded += 1;
            }
        }
        assert_eq!(succeeded, 1);
        assert_eq!(store.find_class(to.id).await.unwrap().unwrap().current_enrollment, 1);
    }

    #[tokio::test]
    async fn failing_transfer_logs_return_unavailable() {
        let store = MemoryStore::new();
        store.set_fail_transfer_logs(true);
        let input = CreateTransferLog {
            previous_enrollment_id: 1,
            new_enrollment_id: 2,
            student_id: 1,
            from_class_id: 1,
            to_class_id: 2,
            reason: None,
            preserve_progress: true,
            transferred_by: 7,
        };
        assert_matches!(store.create_transfer_log(&input).await, Err(StoreError::Unavailable(_)));
        assert!(store.transfer_logs().await.is_empty());
    }
}
