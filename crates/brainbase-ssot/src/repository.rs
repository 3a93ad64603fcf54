//! `PostgreSQL` implementation of [`SsotRepository`]

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::error::{DatabaseError, DatabaseErrorExt, DatabaseOperation, DatabaseResult};
use crate::models::{ContactPayload, MemberDirectory, MemberImportSummary, MemberStatistics};
use crate::traits::SsotRepository;
use brainbase_config::DatabaseConfig;

const MULTI_ACCOUNT_LIMIT: i64 = 10;

/// Repository backed by a sqlx connection pool
#[derive(Clone)]
pub struct DbSsotRepository {
    pool: PgPool,
}

impl DbSsotRepository {
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect using the database settings
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::ConnectionFailed` if the pool cannot be created
    pub async fn connect(config: &DatabaseConfig) -> DatabaseResult<Self> {
        tracing::info!(
            database = %config.safe_connection_string(),
            "Connecting to SSOT database"
        );
        let pool = config
            .create_pool()
            .await
            .map_err(DatabaseError::connection_failed)?;
        Ok(Self::new(pool))
    }

    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn count_users_with_status(&self, status: &str) -> DatabaseResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM users WHERE status = $1")
            .bind(status)
            .fetch_one(&self.pool)
            .await
            .map_db_err(DatabaseOperation::CountUsersByStatus {
                status: status.to_string(),
            })?;
        Ok(row.get("count"))
    }
}

#[async_trait]
impl SsotRepository for DbSsotRepository {
    async fn import_members(
        &self,
        directory: &MemberDirectory,
    ) -> DatabaseResult<MemberImportSummary> {
        let people = directory.people();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_db_err(DatabaseOperation::Transaction {
                description: "begin member import".to_string(),
            })?;

        for person in &people {
            sqlx::query(
                r"
                INSERT INTO people (id, name)
                VALUES ($1, $2)
                ON CONFLICT (id) DO UPDATE SET
                  name = EXCLUDED.name
                ",
            )
            .bind(&person.id)
            .bind(&person.name)
            .execute(&mut *tx)
            .await
            .map_db_err(DatabaseOperation::UpsertPeople {
                count: people.len(),
            })?;
        }
        tracing::info!(people = people.len(), "Upserted people");

        for member in &directory.members {
            sqlx::query(
                r"
                INSERT INTO users (
                  slack_user_id, person_id, workspace_id, name, email,
                  access_level, employment_type, role, status, note
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                ON CONFLICT (slack_user_id) DO UPDATE SET
                  person_id = EXCLUDED.person_id,
                  workspace_id = EXCLUDED.workspace_id,
                  name = EXCLUDED.name,
                  email = EXCLUDED.email,
                  access_level = EXCLUDED.access_level,
                  employment_type = EXCLUDED.employment_type,
                  role = EXCLUDED.role,
                  status = EXCLUDED.status,
                  note = EXCLUDED.note,
                  updated_at = NOW()
                ",
            )
            .bind(&member.slack_id)
            .bind(&member.person_id)
            .bind(&member.workspace)
            .bind(&member.brainbase_name)
            .bind(member.email.as_deref())
            .bind(&member.access_level)
            .bind(&member.employment_type)
            .bind(member.role.as_deref())
            .bind(&member.status)
            .bind(member.note.as_deref())
            .execute(&mut *tx)
            .await
            .map_db_err(DatabaseOperation::UpsertUser {
                slack_user_id: member.slack_id.clone(),
            })?;

            sqlx::query(
                r"
                INSERT INTO user_organizations (slack_user_id, organization_id, projects, departments)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (slack_user_id, organization_id) DO UPDATE SET
                  projects = EXCLUDED.projects,
                  departments = EXCLUDED.departments
                ",
            )
            .bind(&member.slack_id)
            .bind(&member.workspace)
            .bind(member.project_names())
            .bind(&member.departments)
            .execute(&mut *tx)
            .await
            .map_db_err(DatabaseOperation::UpsertUserOrganization {
                slack_user_id: member.slack_id.clone(),
                organization_id: member.workspace.clone(),
            })?;
        }

        tx.commit()
            .await
            .map_db_err(DatabaseOperation::Transaction {
                description: "commit member import".to_string(),
            })?;
        tracing::info!(accounts = directory.members.len(), "Upserted Slack accounts");

        Ok(MemberImportSummary {
            people: people.len(),
            accounts: directory.members.len(),
        })
    }

    async fn member_statistics(&self) -> DatabaseResult<MemberStatistics> {
        let active = self.count_users_with_status("active").await?;
        let inactive = self.count_users_with_status("inactive").await?;

        let rows = sqlx::query(
            r"
            SELECT person_id, COUNT(*) AS account_count
            FROM users
            GROUP BY person_id
            HAVING COUNT(*) > 1
            ORDER BY account_count DESC
            LIMIT $1
            ",
        )
        .bind(MULTI_ACCOUNT_LIMIT)
        .fetch_all(&self.pool)
        .await
        .map_db_err(DatabaseOperation::ListMultiAccountPeople)?;

        let multi_account_people = rows
            .iter()
            .map(|row| (row.get("person_id"), row.get("account_count")))
            .collect();

        Ok(MemberStatistics {
            active,
            inactive,
            multi_account_people,
        })
    }

    async fn insert_contact(&self, id: &str, payload: &ContactPayload) -> DatabaseResult<bool> {
        let operation = DatabaseOperation::InsertContact { id: id.to_string() };
        let payload = serde_json::to_string(payload).map_err(|e| DatabaseError::UnexpectedState {
            operation: Box::new(operation.clone()),
            message: format!("payload serialization failed: {e}"),
        })?;

        let result = sqlx::query(
            r"
            INSERT INTO graph_entities (
              id, entity_type, project_id, payload, role_min, sensitivity, created_at, updated_at
            )
            VALUES ($1, 'contact', NULL, $2::jsonb, 'member', 'internal', NOW(), NOW())
            ON CONFLICT (id) DO NOTHING
            ",
        )
        .bind(id)
        .bind(payload)
        .execute(&self.pool)
        .await
        .map_db_err(operation)?;

        Ok(result.rows_affected() > 0)
    }
}
