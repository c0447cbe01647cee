use super::*;
use crate::adapter::{MySqlAdapter, PostgresAdapter, SqlServerAdapter};

fn mysql(table: &str) -> SqlQueryBuilder {
    SqlQueryBuilder::new(table, Arc::new(MySqlAdapter))
}

#[test]
fn test_default_selection() {
    let qb = mysql("Users");
    assert_eq!(qb.command_text().unwrap(), "SELECT Users.* FROM Users");
}

#[test]
fn test_missing_adapter() {
    let err = SqlQueryBuilder::try_new("Users", None).unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn test_parameter_names_are_sequential() {
    let mut qb = mysql("Users");
    qb.field_comparison("Users", "Id", BinaryOp::GreaterThan, Value::Int(1))
        .and()
        .field_like("Users", "Email", "%x%")
        .and()
        .field_is_in("Users", "Role", vec![Value::Int(1), Value::Int(2)]);

    let names: Vec<_> = qb.parameters().names().collect();
    assert_eq!(names, vec!["Param1", "Param2", "Param3", "Param4"]);
    assert_eq!(qb.current_param_index(), 4);
    assert_eq!(
        qb.command_text().unwrap(),
        "SELECT Users.* FROM Users WHERE Users.Id > @Param1 AND Users.Email LIKE @Param2 AND Users.Role IN (@Param3,@Param4)"
    );
}

#[test]
fn test_add_parameter_first_writer_wins() {
    let mut qb = mysql("Users");
    assert!(qb.add_parameter("Custom", Value::Int(1)));
    assert!(!qb.add_parameter("Custom", Value::Int(2)));
    assert_eq!(qb.parameters().len(), 1);
    assert_eq!(qb.parameters().get("Custom"), Some(&Value::Int(1)));
}

#[test]
fn test_custom_prefix() {
    let mut qb = mysql("Users").with_prefix("p");
    qb.constant(Value::Bool(true));
    assert_eq!(qb.condition_text(), "@p1");
}

#[test]
fn test_in_empty_list() {
    let mut qb = mysql("Users");
    qb.field_is_in("Users", "Id", Vec::new());
    assert_eq!(qb.command_text().unwrap(), "SELECT Users.* FROM Users WHERE 1=0");
    assert!(qb.parameters().is_empty());

    let mut qb = mysql("Users");
    qb.field_not_in("Users", "Id", Vec::new());
    assert_eq!(qb.where_command_text().unwrap(), "WHERE 1=1");
}

#[test]
fn test_between() {
    let mut qb = mysql("Users");
    qb.field_between("Users", "Age", Value::Int(18), Value::Int(30), true);
    assert_eq!(
        qb.condition_text(),
        "(Users.Age NOT BETWEEN @Param1 AND @Param2)"
    );
}

#[test]
fn test_subquery_continues_numbering() {
    let mut qb = mysql("Users");
    qb.field_comparison("Users", "Active", BinaryOp::Equal, Value::Bool(true))
        .and();

    let mut sub = qb.fork("Groups", SqlOperation::Select);
    sub.select_field("Groups", "OwnerId", None)
        .field_comparison("Groups", "Name", BinaryOp::Equal, Value::from("admins"));
    qb.field_is_in_query("Users", "Id", &sub, false).unwrap();

    assert_eq!(
        qb.condition_text(),
        "Users.Active = @Param1 AND Users.Id IN (SELECT Groups.OwnerId FROM Groups WHERE Groups.Name = @Param2)"
    );
    assert_eq!(qb.parameters().len(), 2);
    assert_eq!(qb.bind(Value::Int(0)), "@Param3");
}

#[test]
fn test_clone_does_not_alias() {
    let mut original = mysql("Users");
    original.field_comparison("Users", "Id", BinaryOp::Equal, Value::Int(1));

    let mut copy = original.clone();
    copy.or()
        .field_comparison("Users", "Id", BinaryOp::Equal, Value::Int(2));

    assert_eq!(
        original.command_text().unwrap(),
        "SELECT Users.* FROM Users WHERE Users.Id = @Param1"
    );
    assert_eq!(
        copy.command_text().unwrap(),
        "SELECT Users.* FROM Users WHERE Users.Id = @Param1 OR Users.Id = @Param2"
    );
    assert_eq!(original.parameters().len(), 1);
    assert_eq!(copy.parameters().len(), 2);
}

#[test]
fn test_join_selection_expands_tables() {
    let mut on = mysql("Users").fork("Groups", SqlOperation::Case);
    on.field_to_field_comparison("Users", "GroupId", BinaryOp::Equal, "Groups", "Id");

    let mut qb = mysql("Users");
    qb.join(JoinKind::Left, "Groups", &on).unwrap();
    assert_eq!(
        qb.command_text().unwrap(),
        "SELECT Users.*, Groups.* FROM Users LEFT JOIN Groups ON Users.GroupId = Groups.Id"
    );
}

#[test]
fn test_unforked_subquery_is_rejected() {
    let mut qb = mysql("Users");
    qb.field_comparison("Users", "Email", BinaryOp::Equal, Value::from("outer"))
        .and();

    let mut sub = mysql("UserGroups");
    sub.select_field("UserGroups", "Id", None)
        .field_comparison("UserGroups", "Name", BinaryOp::Equal, Value::from("inner"));
    let err = qb.field_is_in_query("Users", "Id", &sub, false).unwrap_err();
    assert!(err.is_argument());
    assert_eq!(qb.parameters().len(), 1);
    assert_eq!(qb.parameters().get("Param1"), Some(&Value::from("outer")));

    let mut on = mysql("UserGroups").fork("UserGroups", SqlOperation::Case);
    on.field_comparison("UserGroups", "Name", BinaryOp::Equal, Value::from("inner"));
    let err = qb.join(JoinKind::Inner, "UserGroups", &on).unwrap_err();
    assert!(err.is_argument());
    assert_eq!(qb.table_names(), ["Users".to_string()]);
}

#[test]
fn test_count_grouping_having_order() {
    let mut qb = mysql("Users");
    qb.set_operation(SqlOperation::Count);
    assert_eq!(qb.command_text().unwrap(), "SELECT COUNT(*) FROM Users");

    qb.set_operation(SqlOperation::Select);
    qb.select_field("Users", "Role", None)
        .select_aggregate("COUNT", "Users", "Id", Some("Total"))
        .group_by("Users", "Role")
        .having("COUNT", "Users", "Id", BinaryOp::GreaterThan, Value::Int(5))
        .order_by("Users", "Role", true);
    assert_eq!(
        qb.command_text().unwrap(),
        "SELECT Users.Role, COUNT(Users.Id) AS Total FROM Users GROUP BY Users.Role HAVING COUNT(Users.Id) > @Param1 ORDER BY Users.Role DESC"
    );
}

#[test]
fn test_pagination() {
    let mut qb = mysql("Users");
    qb.order_by("Users", "Id", false).take(10);
    assert_eq!(
        qb.command_text().unwrap(),
        "SELECT Users.* FROM Users ORDER BY Users.Id LIMIT 10"
    );
    qb.skip(20);
    assert_eq!(
        qb.command_text().unwrap(),
        "SELECT Users.* FROM Users ORDER BY Users.Id LIMIT 20, 10"
    );
    qb.page(3, 25);
    assert_eq!((qb.page_size(), qb.page_index()), (Some(25), 75));
}

#[test]
fn test_insert_update_delete() {
    let mut qb = mysql("Users");
    qb.set_operation(SqlOperation::Insert);
    qb.insert_row(vec![
        ("Email".into(), Value::from("a@b.c")),
        ("Name".into(), Value::from("A")),
    ])
    .unwrap();
    qb.insert_row(vec![
        ("Email".into(), Value::from("d@e.f")),
        ("Name".into(), Value::from("D")),
    ])
    .unwrap();
    assert_eq!(
        qb.command_text().unwrap(),
        "INSERT INTO Users (Email, Name) VALUES (@Param1, @Param2), (@Param3, @Param4)"
    );
    assert_eq!(qb.insert_target().unwrap(), "Users");

    let mut qb = mysql("Users");
    qb.set_operation(SqlOperation::Update);
    qb.update_field_with("Name", Value::from("B"))
        .field_comparison("Users", "Id", BinaryOp::Equal, Value::Int(1));
    assert_eq!(
        qb.command_text().unwrap(),
        "UPDATE Users SET Name = @Param1 WHERE Users.Id = @Param2"
    );

    let mut qb = mysql("Users");
    qb.set_operation(SqlOperation::Delete);
    qb.field_is_null("Users", "Email");
    assert_eq!(
        qb.command_text().unwrap(),
        "DELETE FROM Users WHERE Users.Email IS NULL"
    );
}

#[test]
fn test_insert_row_validation() {
    let mut qb = mysql("Users");
    assert!(qb.insert_row(Vec::new()).unwrap_err().is_argument());

    qb.insert_row(vec![("A".into(), Value::Int(1))]).unwrap();
    let err = qb.insert_row(vec![("B".into(), Value::Int(2))]).unwrap_err();
    assert!(err.is_argument());

    let mut qb = mysql("Users");
    qb.set_operation(SqlOperation::Insert);
    assert!(qb.command_text().unwrap_err().is_argument());
}

#[test]
fn test_insert_from_targets_last_table() {
    let mut qb = mysql("Users");
    qb.select_field("Users", "Email", None)
        .field_comparison("Users", "Id", BinaryOp::GreaterThan, Value::Int(100))
        .insert_from("ArchivedUsers", ["Email"]);
    assert_eq!(qb.insert_target().unwrap(), "ArchivedUsers");
    assert_eq!(
        qb.command_text().unwrap(),
        "INSERT INTO ArchivedUsers (Email) SELECT Users.Email FROM Users WHERE Users.Id > @Param1"
    );
}

#[test]
fn test_accessors_reject_wrong_operation() {
    let mut qb = mysql("Users");
    assert!(qb.insert_target().unwrap_err().is_invalid_operation());

    qb.set_operation(SqlOperation::Insert);
    assert!(qb.where_command_text().unwrap_err().is_invalid_operation());
}

#[test]
fn test_case_renders_conditions_verbatim() {
    let mut qb = mysql("Users").fork("Users", SqlOperation::Case);
    qb.begin_expression()
        .field_reference("Users", "Id")
        .comparison_operator(BinaryOp::LessThanOrEqual)
        .constant(Value::Int(3))
        .end_expression();
    assert_eq!(qb.command_text().unwrap(), "(Users.Id <= @Param1)");
}

#[test]
fn test_postgres_placeholders_and_quoting() {
    let mut qb = SqlQueryBuilder::new("Users", Arc::new(PostgresAdapter));
    qb.field_comparison("Users", "Id", BinaryOp::Equal, Value::Int(7))
        .take(5);
    assert_eq!(
        qb.command_text().unwrap(),
        r#"SELECT "Users".* FROM "Users" WHERE "Users"."Id" = $1 LIMIT 5"#
    );
    assert_eq!(qb.parameters().first(), Some(("Param1", &Value::Int(7))));
}

#[test]
fn test_postgres_positions_restart_per_statement() {
    let mut qb = SqlQueryBuilder::new("Users", Arc::new(PostgresAdapter)).starting_at(2);
    qb.field_comparison("Users", "Active", BinaryOp::Equal, Value::Bool(true))
        .and();

    let mut sub = qb.fork("Groups", SqlOperation::Select);
    sub.select_field("Groups", "OwnerId", None)
        .field_comparison("Groups", "Name", BinaryOp::Equal, Value::from("admins"));
    qb.field_is_in_query("Users", "Id", &sub, false).unwrap();

    assert_eq!(
        qb.condition_text(),
        r#""Users"."Active" = $1 AND "Users"."Id" IN (SELECT "Groups"."OwnerId" FROM "Groups" WHERE "Groups"."Name" = $2)"#
    );
    let names: Vec<_> = qb.parameters().names().collect();
    assert_eq!(names, vec!["Param3", "Param4"]);
}

#[test]
fn test_sqlserver_paging() {
    let mut qb = SqlQueryBuilder::new("Users", Arc::new(SqlServerAdapter));
    qb.order_by("Users", "Id", false).page(1, 10);
    assert_eq!(
        qb.command_text().unwrap(),
        "SELECT [Users].* FROM [Users] ORDER BY [Users].[Id] OFFSET 10 ROWS FETCH NEXT 10 ROWS ONLY"
    );
}
