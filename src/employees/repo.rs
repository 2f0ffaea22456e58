use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::validate::NewEmployee;

#[derive(Debug, Clone, FromRow)]
pub struct Employee {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub position: String,
    pub department: String,
    pub salary: f64,
    pub date_of_joining: Date,
    pub phone: Option<String>,
    pub photo_url: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Exact-match filter; absent fields impose no constraint.
#[derive(Debug, Default)]
pub struct EmployeeFilter {
    pub department: Option<String>,
    pub position: Option<String>,
}

const COLUMNS: &str = "id, first_name, last_name, email, position, department, salary, \
                       date_of_joining, phone, photo_url, created_at, updated_at";

fn list_query(filter: &EmployeeFilter) -> QueryBuilder<'_, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {COLUMNS} FROM employees"));
    let mut joiner = " WHERE ";
    if let Some(department) = filter.department.as_deref() {
        qb.push(joiner);
        joiner = " AND ";
        qb.push("department = ").push_bind(department);
    }
    if let Some(position) = filter.position.as_deref() {
        qb.push(joiner);
        qb.push("position = ").push_bind(position);
    }
    qb.push(" ORDER BY created_at DESC");
    qb
}

/// Newest-created first.
pub async fn list(db: &PgPool, filter: &EmployeeFilter) -> anyhow::Result<Vec<Employee>> {
    let mut qb = list_query(filter);
    let rows = qb.build_query_as::<Employee>().fetch_all(db).await?;
    Ok(rows)
}

pub async fn get(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Employee>> {
    let row = sqlx::query_as::<_, Employee>(&format!(
        "SELECT {COLUMNS} FROM employees WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<Employee>> {
    let row = sqlx::query_as::<_, Employee>(&format!(
        "SELECT {COLUMNS} FROM employees WHERE email = $1"
    ))
    .bind(email)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn insert(db: &PgPool, employee: &NewEmployee) -> anyhow::Result<Employee> {
    let row = sqlx::query_as::<_, Employee>(&format!(
        r#"
        INSERT INTO employees
            (first_name, last_name, email, position, department, salary,
             date_of_joining, phone, photo_url)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(&employee.first_name)
    .bind(&employee.last_name)
    .bind(&employee.email)
    .bind(&employee.position)
    .bind(&employee.department)
    .bind(employee.salary)
    .bind(employee.date_of_joining)
    .bind(&employee.phone)
    .bind(&employee.photo_url)
    .fetch_one(db)
    .await?;
    Ok(row)
}

/// Full replace of the validated row. Last write wins on concurrent
/// updates; there is no version column.
pub async fn update(
    db: &PgPool,
    id: Uuid,
    employee: &NewEmployee,
) -> anyhow::Result<Option<Employee>> {
    let row = sqlx::query_as::<_, Employee>(&format!(
        r#"
        UPDATE employees
        SET first_name = $1, last_name = $2, email = $3, position = $4,
            department = $5, salary = $6, date_of_joining = $7, phone = $8,
            photo_url = $9, updated_at = now()
        WHERE id = $10
        RETURNING {COLUMNS}
        "#
    ))
    .bind(&employee.first_name)
    .bind(&employee.last_name)
    .bind(&employee.email)
    .bind(&employee.position)
    .bind(&employee.department)
    .bind(employee.salary)
    .bind(employee.date_of_joining)
    .bind(&employee.phone)
    .bind(&employee.photo_url)
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

/// Hard delete; returns the stored photo reference so the caller can drop
/// the object. Outer None means the id was unknown.
pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Option<String>>> {
    let row = sqlx::query_as::<_, (Option<String>,)>(
        "DELETE FROM employees WHERE id = $1 RETURNING photo_url",
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row.map(|(photo_url,)| photo_url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_query_without_filter_has_no_where() {
        let sql = list_query(&EmployeeFilter::default()).into_sql();
        assert!(!sql.contains("WHERE"));
        assert!(sql.ends_with("ORDER BY created_at DESC"));
    }

    #[test]
    fn list_query_with_department_only() {
        let filter = EmployeeFilter {
            department: Some("Eng".into()),
            position: None,
        };
        let sql = list_query(&filter).into_sql();
        assert!(sql.contains("WHERE department = $1"));
        assert!(!sql.contains("position ="));
    }

    #[test]
    fn list_query_with_position_only() {
        let filter = EmployeeFilter {
            department: None,
            position: Some("Developer".into()),
        };
        let sql = list_query(&filter).into_sql();
        assert!(sql.contains("WHERE position = $1"));
        assert!(!sql.contains("department ="));
    }

    #[test]
    fn list_query_combines_filters_with_and() {
        let filter = EmployeeFilter {
            department: Some("Eng".into()),
            position: Some("Developer".into()),
        };
        let sql = list_query(&filter).into_sql();
        assert!(sql.contains("WHERE department = $1 AND position = $2"));
    }
}
