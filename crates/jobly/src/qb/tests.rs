//! Cross-builder tests for the qb module.

use crate::qb::expr::Expr;
use crate::qb::param::ParamList;
use crate::qb::{SqlQb, delete, insert, select, update};

#[test]
fn test_select_basic() {
    assert_eq!(select("users").to_sql(), "SELECT * FROM users");
}

#[test]
fn test_insert_basic() {
    let sql = insert("users")
        .set("username", "alice")
        .set("email", "alice@example.com")
        .to_sql();
    assert_eq!(sql, "INSERT INTO users (username, email) VALUES ($1, $2)");
}

#[test]
fn test_update_basic() {
    let sql = update("jobs").set("salary", 1.5f64).eq("id", 1i32).to_sql();
    assert_eq!(sql, "UPDATE jobs SET salary = $1 WHERE id = $2");
}

#[test]
fn test_delete_basic() {
    assert_eq!(
        delete("users").eq("username", "bob").to_sql(),
        "DELETE FROM users WHERE username = $1"
    );
}

#[test]
fn test_complex_where_expr() {
    let expr = Expr::and(vec![
        Expr::any_ilike(&["title", "company_handle"], "%eng%".to_string()),
        Expr::or(vec![
            Expr::gte("salary", 100.0f64),
            Expr::and(vec![Expr::is_null("equity"), Expr::lt("salary", 5.0f64)]),
        ]),
    ]);

    let mut params = ParamList::new();
    let sql = expr.build(&mut params);

    assert_eq!(
        sql,
        "(title ILIKE $1 OR company_handle ILIKE $1) AND (salary >= $2 OR (equity IS NULL AND salary < $3))"
    );
    assert_eq!(params.len(), 3);
}

#[test]
fn test_select_and_expr_numbering_with_update_expr() {
    let sql = update("companies")
        .set("name", "Apple")
        .set("num_employees", 10i32)
        .and_expr(Expr::eq("handle", "AAPL"))
        .returning("*")
        .to_sql();
    assert_eq!(
        sql,
        "UPDATE companies SET name = $1, num_employees = $2 WHERE handle = $3 RETURNING *"
    );
}

#[test]
fn test_builders_are_rebuildable() {
    let qb = select("jobs").eq("id", 3i32).order_by("id");
    let first = qb.build();
    let second = qb.build();
    assert_eq!(first.sql, second.sql);
    assert_eq!(first.params.len(), second.params.len());
}
