//! In-memory program store, used by handler tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::ProgramStore;
use crate::errors::AppError;
use crate::models::{Direction, Page, PageRequest, Program, ProgramFields};

#[derive(Default)]
struct Inner {
    next_id: i64,
    programs: BTreeMap<i64, Program>,
}

/// Program store kept in a map behind an async lock. Ids start at 1.
#[derive(Default)]
pub struct InMemoryProgramStore {
    inner: RwLock<Inner>,
}

impl InMemoryProgramStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgramStore for InMemoryProgramStore {
    async fn create(&self, fields: &ProgramFields, owner: Option<&str>) -> Result<Program, AppError> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let program = Program::from_fields(inner.next_id, fields.clone(), owner.map(str::to_string));
        inner.programs.insert(program.id, program.clone());
        Ok(program)
    }

    async fn update(&self, id: i64, fields: &ProgramFields) -> Result<Option<Program>, AppError> {
        let mut inner = self.inner.write().await;
        Ok(inner.programs.get_mut(&id).map(|existing| {
            let owner = existing.owner.take();
            *existing = Program::from_fields(id, fields.clone(), owner);
            existing.clone()
        }))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Program>, AppError> {
        Ok(self.inner.read().await.programs.get(&id).cloned())
    }

    async fn exists_by_id(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.inner.read().await.programs.contains_key(&id))
    }

    async fn find_all(&self, request: &PageRequest) -> Result<Page<Program>, AppError> {
        let inner = self.inner.read().await;
        let mut all: Vec<&Program> = inner.programs.values().collect();

        let orders = request.effective_sort();
        all.sort_by(|a, b| {
            orders
                .iter()
                .map(|o| match o.direction {
                    Direction::Asc => o.field.compare(a, b),
                    Direction::Desc => o.field.compare(b, a),
                })
                .find(|ordering| ordering.is_ne())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let content = all
            .into_iter()
            .skip(offset)
            .take(request.size as usize)
            .cloned()
            .collect();

        Ok(Page {
            content,
            total: inner.programs.len() as u64,
            page: request.page,
            size: request.size,
        })
    }

    async fn find_by_owner(&self, login: &str) -> Result<Vec<Program>, AppError> {
        Ok(self
            .inner
            .read()
            .await
            .programs
            .values()
            .filter(|p| p.owner.as_deref() == Some(login))
            .cloned()
            .collect())
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), AppError> {
        self.inner.write().await.programs.remove(&id);
        Ok(())
    }

    async fn count(&self) -> Result<u64, AppError> {
        Ok(self.inner.read().await.programs.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PageParams;
    use chrono::NaiveDate;

    fn fields(title: &str) -> ProgramFields {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        ProgramFields {
            cover: None,
            cover_content_type: None,
            title: title.to_string(),
            description: "desc".to_string(),
            start_date: date,
            end_date: date,
            tags: None,
        }
    }

    #[tokio::test]
    async fn test_ids_are_assigned_and_never_reused() {
        let store = InMemoryProgramStore::new();
        let first = store.create(&fields("a"), None).await.unwrap();
        store.delete_by_id(first.id).await.unwrap();
        let second = store.create(&fields("b"), None).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_keeps_owner_and_misses_unknown_ids() {
        let store = InMemoryProgramStore::new();
        let created = store.create(&fields("a"), Some("alice")).await.unwrap();

        let updated = store.update(created.id, &fields("b")).await.unwrap().unwrap();
        assert_eq!(updated.title, "b");
        assert_eq!(updated.owner.as_deref(), Some("alice"));

        assert!(store.update(999, &fields("c")).await.unwrap().is_none());
        assert!(!store.exists_by_id(999).await.unwrap());
    }

    #[tokio::test]
    async fn test_find_all_sorts_and_pages() {
        let store = InMemoryProgramStore::new();
        for title in ["c", "a", "b"] {
            store.create(&fields(title), None).await.unwrap();
        }

        let request = PageRequest::from_params(&PageParams {
            page: Some(0),
            size: Some(2),
            sort: vec!["title,desc".to_string()],
        })
        .unwrap();
        let page = store.find_all(&request).await.unwrap();

        assert_eq!(page.total, 3);
        let titles: Vec<_> = page.content.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["c", "b"]);
    }

    #[tokio::test]
    async fn test_find_by_owner_and_tolerant_delete() {
        let store = InMemoryProgramStore::new();
        store.create(&fields("a"), Some("alice")).await.unwrap();
        store.create(&fields("b"), Some("bob")).await.unwrap();

        let mine = store.find_by_owner("alice").await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].title, "a");

        store.delete_by_id(12345).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 2);
    }
}
