//! In-process store with the same semantics as the PostgreSQL schema.
//!
//! Used by `forum-api --in-memory` for local runs and by the test suite.
//! Ids come from per-table sequences that never reuse a value, and deleting
//! a course cascades to its questions like the foreign key does.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::store::{Course, ForumStore, Question, Result, StoreError};

#[derive(Debug, Default)]
struct Tables {
    courses: BTreeMap<i32, Course>,
    questions: BTreeMap<i32, Question>,
    next_course_id: i32,
    next_question_id: i32,
}

impl Tables {
    fn next_course_id(&mut self) -> i32 {
        self.next_course_id += 1;
        self.next_course_id
    }

    fn next_question_id(&mut self) -> i32 {
        self.next_question_id += 1;
        self.next_question_id
    }

    fn question_in_course(&mut self, course_id: i32, question_id: i32) -> Option<&mut Question> {
        self.questions
            .get_mut(&question_id)
            .filter(|q| q.course_id == course_id)
    }
}

/// Mutex-guarded tables; each operation holds the lock for its whole body.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> std::sync::MutexGuard<'_, Tables> {
        // No operation panics between mutations, so poisoned data is intact.
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ForumStore for MemoryStore {
    async fn list_courses(&self) -> Result<Vec<Course>> {
        Ok(self.tables().courses.values().cloned().collect())
    }

    async fn get_course(&self, id: i32) -> Result<Option<Course>> {
        Ok(self.tables().courses.get(&id).cloned())
    }

    async fn create_course(&self, name: &str) -> Result<Course> {
        let mut tables = self.tables();
        let course = Course {
            id: tables.next_course_id(),
            name: name.to_string(),
        };
        tables.courses.insert(course.id, course.clone());
        Ok(course)
    }

    async fn delete_course(&self, id: i32) -> Result<Option<Course>> {
        let mut tables = self.tables();
        let removed = tables.courses.remove(&id);
        if removed.is_some() {
            tables.questions.retain(|_, q| q.course_id != id);
        }
        Ok(removed)
    }

    async fn list_questions(&self, course_id: i32) -> Result<Vec<Question>> {
        Ok(self
            .tables()
            .questions
            .values()
            .filter(|q| q.course_id == course_id)
            .cloned()
            .collect())
    }

    async fn create_question(&self, course_id: i32, title: &str, text: &str) -> Result<Question> {
        let mut tables = self.tables();
        if !tables.courses.contains_key(&course_id) {
            return Err(StoreError::CourseNotFound(course_id));
        }
        let question = Question {
            id: tables.next_question_id(),
            title: title.to_string(),
            text: text.to_string(),
            upvotes: 0,
            course_id,
        };
        tables.questions.insert(question.id, question.clone());
        Ok(question)
    }

    async fn upvote_question(&self, course_id: i32, question_id: i32) -> Result<Option<Question>> {
        let mut tables = self.tables();
        Ok(tables.question_in_course(course_id, question_id).map(|q| {
            q.upvotes += 1;
            q.clone()
        }))
    }

    async fn delete_question(&self, course_id: i32, question_id: i32) -> Result<Option<Question>> {
        let mut tables = self.tables();
        if tables.question_in_course(course_id, question_id).is_none() {
            return Ok(None);
        }
        Ok(tables.questions.remove(&question_id))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = MemoryStore::new();
        let a = store.create_course("CS101").await.unwrap();
        store.delete_course(a.id).await.unwrap();
        let b = store.create_course("CS102").await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
    }

    #[tokio::test]
    async fn upvote_requires_matching_course() {
        let store = MemoryStore::new();
        let c1 = store.create_course("CS101").await.unwrap();
        let c2 = store.create_course("CS102").await.unwrap();
        let q = store.create_question(c1.id, "Why?", "Explain X").await.unwrap();

        assert!(store.upvote_question(c2.id, q.id).await.unwrap().is_none());
        assert!(store.delete_question(c2.id, q.id).await.unwrap().is_none());

        let upvoted = store.upvote_question(c1.id, q.id).await.unwrap().unwrap();
        assert_eq!(upvoted.upvotes, 1);
    }

    #[tokio::test]
    async fn delete_course_cascades() {
        let store = MemoryStore::new();
        let keep = store.create_course("Keep").await.unwrap();
        let drop = store.create_course("Drop").await.unwrap();
        store.create_question(keep.id, "Kept", "stays here").await.unwrap();
        store.create_question(drop.id, "Gone", "goes away").await.unwrap();

        store.delete_course(drop.id).await.unwrap();

        assert!(store.list_questions(drop.id).await.unwrap().is_empty());
        assert_eq!(store.list_questions(keep.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn question_needs_existing_course() {
        let store = MemoryStore::new();
        let err = store.create_question(42, "Title", "Text").await.unwrap_err();
        assert!(matches!(err, StoreError::CourseNotFound(42)));
    }
}
