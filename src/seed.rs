use anyhow::Context;
use tracing::info;
use uuid::Uuid;

use crate::auth::{
    password::hash_password_blocking,
    repo::UserStore,
    repo_types::{NewUser, Role, User},
};
use crate::db::StoreError;
use crate::lessons::{repo::LessonStore, repo_types::NewLesson};

pub struct DemoAccount {
    pub email: &'static str,
    pub password: &'static str,
    pub name: &'static str,
    pub role: Role,
}

pub const DEMO_INSTRUCTOR: DemoAccount = DemoAccount {
    email: "instructor@sebastopol.academy",
    password: "instructor123",
    name: "Dr. Security Expert",
    role: Role::Instructor,
};

pub const DEMO_STUDENT: DemoAccount = DemoAccount {
    email: "student@sebastopol.academy",
    password: "student123",
    name: "Test Student",
    role: Role::Student,
};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub instructor_created: bool,
    pub student_created: bool,
    pub lesson_created: bool,
}

/// Creates the demo accounts and a starter lesson. Safe to run repeatedly.
pub async fn seed_demo_data(
    users: &dyn UserStore,
    lessons: &dyn LessonStore,
) -> anyhow::Result<SeedReport> {
    let mut report = SeedReport::default();

    let (instructor, created) = ensure_user(users, &DEMO_INSTRUCTOR).await?;
    report.instructor_created = created;
    let (_, created) = ensure_user(users, &DEMO_STUDENT).await?;
    report.student_created = created;

    if lessons.count_by_instructor(instructor.id).await? == 0 {
        lessons
            .create(NewLesson {
                title: "Phishing Awareness Training".into(),
                description: "Learn to identify and prevent phishing attacks".into(),
                content: "This lesson covers common phishing techniques and protection strategies."
                    .into(),
                instructor_id: instructor.id,
                category: "Security".into(),
                difficulty_level: "Beginner".into(),
                estimated_duration: 30,
            })
            .await?;
        report.lesson_created = true;
        info!("starter lesson created");
    }

    Ok(report)
}

async fn ensure_user(users: &dyn UserStore, account: &DemoAccount) -> anyhow::Result<(User, bool)> {
    if let Some(existing) = users.find_by_email(account.email).await? {
        info!(email = account.email, "demo account already exists");
        return Ok((existing, false));
    }

    let password_hash = hash_password_blocking(account.password.to_string()).await?;
    let created = users
        .create(NewUser {
            email: account.email.into(),
            password_hash,
            name: account.name.into(),
            role: account.role,
        })
        .await;

    match created {
        Ok(user) => {
            info!(email = account.email, role = %account.role, "demo account created");
            Ok((user, true))
        }
        // Another seeder won the race; use its row.
        Err(StoreError::UniqueViolation(_)) => {
            let user = users
                .find_by_email(account.email)
                .await?
                .with_context(|| format!("{} vanished after unique violation", account.email))?;
            Ok((user, false))
        }
        Err(e) => Err(e.into()),
    }
}

/// Looks up a demo account's id, failing if seeding has not run.
pub async fn demo_user(users: &dyn UserStore, account: &DemoAccount) -> anyhow::Result<(Uuid, Role)> {
    let user = users
        .find_by_email(account.email)
        .await?
        .with_context(|| format!("demo account {} not found; run the seed binary first", account.email))?;
    Ok((user.id, user.role))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{password::verify_password, repo::MemoryUserStore};
    use crate::lessons::repo::MemoryLessonStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let users = Arc::new(MemoryUserStore::new());
        let lessons = MemoryLessonStore::new(users.clone());

        let first = seed_demo_data(users.as_ref(), &lessons).await.expect("seed");
        assert_eq!(
            first,
            SeedReport {
                instructor_created: true,
                student_created: true,
                lesson_created: true
            }
        );

        let second = seed_demo_data(users.as_ref(), &lessons).await.expect("reseed");
        assert_eq!(second, SeedReport::default());
        assert_eq!(lessons.list_published().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn demo_accounts_can_log_in_with_documented_passwords() {
        let users = Arc::new(MemoryUserStore::new());
        let lessons = MemoryLessonStore::new(users.clone());
        seed_demo_data(users.as_ref(), &lessons).await.unwrap();

        let instructor = users.find_by_email(DEMO_INSTRUCTOR.email).await.unwrap().unwrap();
        assert_eq!(instructor.role, Role::Instructor);
        assert!(verify_password("instructor123", &instructor.password_hash).unwrap());

        let (id, role) = demo_user(users.as_ref(), &DEMO_STUDENT).await.unwrap();
        assert_eq!(role, Role::Student);
        let student = users.find_by_id(id).await.unwrap().unwrap();
        assert!(verify_password("student123", &student.password_hash).unwrap());
    }

    #[tokio::test]
    async fn demo_user_reports_missing_seed() {
        let users = MemoryUserStore::new();
        let err = demo_user(&users, &DEMO_STUDENT).await.unwrap_err();
        assert!(err.to_string().contains("seed"));
    }
}
