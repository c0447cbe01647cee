mod common;

use chrono::{Duration, TimeZone, Utc};
use common::{User, UserGroup, UserType, mysql};
use exprsql::{
    BinaryOp, Dialect, Entity, Expr, SqlBuilder, SqlBuilderCollection, SqlContext, Value, not,
};

#[test]
fn query_count() {
    let ctx = mysql();
    let query = SqlBuilder::<User>::count(&ctx)
        .unwrap()
        .select_count(User::ID)
        .unwrap()
        .filter(User::ID.gt(10))
        .unwrap();
    assert_eq!(
        query.command_text().unwrap(),
        "SELECT COUNT(Users.Id) FROM Users WHERE Users.Id > @Param1"
    );

    let query = SqlBuilder::<User>::count(&ctx)
        .unwrap()
        .filter(User::ID.gt(10))
        .unwrap();
    assert_eq!(
        query.command_text().unwrap(),
        "SELECT COUNT(*) FROM Users WHERE Users.Id > @Param1"
    );
}

#[test]
fn query_with_pagination() {
    let ctx = mysql();
    let query = SqlBuilder::<User>::select(&ctx)
        .unwrap()
        .order_by(User::ID)
        .unwrap()
        .take(10);
    assert_eq!(
        query.command_text().unwrap(),
        "SELECT Users.* FROM Users ORDER BY Users.Id LIMIT 10"
    );

    let query = query.skip(20);
    assert_eq!(
        query.command_text().unwrap(),
        "SELECT Users.* FROM Users ORDER BY Users.Id LIMIT 20, 10"
    );

    let query = SqlBuilder::<User>::select(&ctx)
        .unwrap()
        .select_fields(Expr::record([("Id", User::ID.expr()), ("Email", User::EMAIL.expr())]))
        .unwrap()
        .order_by(User::ID)
        .unwrap()
        .take(10);
    assert_eq!(
        query.command_text().unwrap(),
        "SELECT Users.Id, Users.Email FROM Users ORDER BY Users.Id LIMIT 10"
    );

    let cutoff = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() - Duration::days(50);
    let query = SqlBuilder::<User>::select(&ctx)
        .unwrap()
        .filter(User::MODIFIED_DATE.gt(cutoff))
        .unwrap()
        .order_by(User::ID)
        .unwrap()
        .take(10)
        .skip(1);
    assert_eq!(
        query.command_text().unwrap(),
        "SELECT Users.* FROM Users WHERE Users.ModifiedDate > @Param1 ORDER BY Users.Id LIMIT 1, 10"
    );
    assert_eq!(query.parameters().get("Param1"), Some(&Value::Timestamp(cutoff)));
}

#[test]
fn find_by_field_value() {
    let email = "user@domain1.com";
    let query = SqlBuilder::<User>::select(&mysql())
        .unwrap()
        .filter(User::EMAIL.eq(email))
        .unwrap();
    assert_eq!(
        query.command_text().unwrap(),
        "SELECT Users.* FROM Users WHERE Users.Email = @Param1"
    );
    assert_eq!(
        query.parameters().first(),
        Some(("Param1", &Value::from(email)))
    );
}

#[test]
fn find_single_by_field_value() {
    let query = SqlBuilder::<User>::select_single(&mysql())
        .unwrap()
        .filter(User::EMAIL.eq("user@domain1.com"))
        .unwrap();
    assert_eq!(
        query.command_text().unwrap(),
        "SELECT Users.* FROM Users WHERE Users.Email = @Param1 LIMIT 1"
    );
}

#[test]
fn find_by_field_value_like() {
    let query = SqlBuilder::<User>::select(&mysql())
        .unwrap()
        .filter(User::EMAIL.contains("domain.com"))
        .unwrap();
    assert_eq!(
        query.command_text().unwrap(),
        "SELECT Users.* FROM Users WHERE Users.Email LIKE @Param1"
    );
    assert_eq!(
        query.parameters().get("Param1"),
        Some(&Value::from("%domain.com%"))
    );
}

#[test]
fn order_by_field() {
    let ctx = mysql();
    let query = SqlBuilder::<User>::select(&ctx)
        .unwrap()
        .order_by(User::EMAIL)
        .unwrap();
    assert_eq!(
        query.command_text().unwrap(),
        "SELECT Users.* FROM Users ORDER BY Users.Email"
    );

    let query = SqlBuilder::<User>::select(&ctx)
        .unwrap()
        .order_by_desc(User::EMAIL)
        .unwrap();
    assert_eq!(
        query.command_text().unwrap(),
        "SELECT Users.* FROM Users ORDER BY Users.Email DESC"
    );
}

#[test]
fn where_enum_binds_discriminant() {
    let role = UserType::Developer;
    let query = SqlBuilder::<User>::select(&mysql())
        .unwrap()
        .filter(User::ROLE.eq(role))
        .unwrap();
    assert_eq!(
        query.command_text().unwrap(),
        "SELECT Users.* FROM Users WHERE Users.Role = @Param1"
    );
    assert_eq!(query.parameters().get("Param1"), Some(&Value::Int(3)));
}

#[test]
fn where_is_in() {
    let ctx = mysql();
    let expected = "SELECT Users.* FROM Users WHERE Users.Id IN (@Param1,@Param2,@Param3)";

    let query = SqlBuilder::<User>::select(&ctx)
        .unwrap()
        .filter_in(User::ID, vec![1, 2, 4])
        .unwrap();
    assert_eq!(query.command_text().unwrap(), expected);
    assert_eq!(query.parameters().len(), 3);

    let ids = [1_i64, 2, 4];
    let query = SqlBuilder::<User>::select(&ctx)
        .unwrap()
        .filter_in(User::ID, ids.iter().copied())
        .unwrap();
    assert_eq!(query.command_text().unwrap(), expected);

    let query = SqlBuilder::<User>::select(&ctx)
        .unwrap()
        .filter_not_in(User::ID, Vec::<i64>::new())
        .unwrap();
    assert_eq!(
        query.command_text().unwrap(),
        "SELECT Users.* FROM Users WHERE 1=1"
    );
}

#[test]
fn where_between() {
    let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
    let query = SqlBuilder::<User>::select(&mysql())
        .unwrap()
        .filter(User::EMAIL.eq("Test"))
        .unwrap()
        .filter_between(User::MODIFIED_DATE, start, start + Duration::days(1))
        .unwrap();
    assert_eq!(
        query.command_text().unwrap(),
        "SELECT Users.* FROM Users WHERE Users.Email = @Param1 AND (Users.ModifiedDate BETWEEN @Param2 AND @Param3)"
    );
    assert_eq!(query.parameters().len(), 3);
}

#[test]
fn multiple_queries() {
    let mut batch = SqlBuilderCollection::new(&mysql());
    batch
        .select::<User>(|q| q.filter(User::ID.eq(2)))
        .unwrap()
        .select::<UserGroup>(|q| q.filter(UserGroup::ID.eq(5)))
        .unwrap();

    assert_eq!(
        batch.command_text().unwrap(),
        "SELECT Users.* FROM Users WHERE Users.Id = @Param1\r\nSELECT UserGroups.* FROM UserGroups WHERE UserGroups.Id = @Param2"
    );
    assert_eq!(batch.parameters().len(), 2);
}

#[test]
fn join_with_aliased_projection() {
    let query = SqlBuilder::<User>::select(&mysql())
        .unwrap()
        .filter(User::FIRST_NAME.contains("name"))
        .unwrap()
        .left_join::<UserGroup>(User::ID.eq_field(UserGroup::ID))
        .unwrap()
        .select_fields(Expr::record([
            ("Id", User::ID.expr()),
            ("Email", User::EMAIL.expr()),
            ("GroupName", UserGroup::NAME.expr()),
        ]))
        .unwrap();
    assert_eq!(
        query.command_text().unwrap(),
        "SELECT Users.Id, Users.Email, UserGroups.Name AS GroupName FROM Users LEFT JOIN UserGroups ON Users.Id = UserGroups.Id WHERE Users.FirstName LIKE @Param1"
    );
}

#[test]
fn where_raw_templates() {
    let ctx = mysql();
    let query = SqlBuilder::<User>::select(&ctx)
        .unwrap()
        .filter_raw("BIN_TO_UUID(@0) = @1", vec![User::UUID.into(), "123456789".into()])
        .unwrap();
    assert_eq!(
        query.command_text().unwrap(),
        "SELECT Users.* FROM Users WHERE BIN_TO_UUID(Users.Uuid) = @Param1"
    );
    assert_eq!(query.parameters().len(), 1);

    let query = SqlBuilder::<User>::select(&ctx)
        .unwrap()
        .filter_raw(
            "@0 = @1 OR @0 = @2 OR @0 = @3 OR @0 = @4",
            vec![User::UUID.into(), 1.into(), "2".into(), 3.into(), "4".into()],
        )
        .unwrap();
    assert_eq!(
        query.command_text().unwrap(),
        "SELECT Users.* FROM Users WHERE Users.Uuid = @Param1 OR Users.Uuid = @Param2 OR Users.Uuid = @Param3 OR Users.Uuid = @Param4"
    );
    assert_eq!(query.parameters().len(), 4);

    let err = SqlBuilder::<User>::select(&ctx)
        .unwrap()
        .filter_raw("@0 = @2", vec![User::UUID.into(), 1.into()])
        .unwrap_err();
    assert!(err.is_argument());
}

#[test]
fn or_and_negation() {
    let query = SqlBuilder::<User>::select(&mysql())
        .unwrap()
        .filter(not(User::EMAIL.is_null()) | User::ID.lt(5))
        .unwrap()
        .or_filter(User::ROLE.eq(UserType::Admin))
        .unwrap();
    assert_eq!(
        query.command_text().unwrap(),
        "SELECT Users.* FROM Users WHERE (NOT (Users.Email IS NULL) OR Users.Id < @Param1) OR Users.Role = @Param2"
    );
}

#[test]
fn sub_query_continues_numbering() {
    let query = SqlBuilder::<User>::select(&mysql())
        .unwrap()
        .filter(User::EMAIL.ends_with("@corp.com"))
        .unwrap()
        .filter_in_query::<UserGroup>(User::ID, |sub| {
            sub.select_fields(UserGroup::ID)?
                .filter(UserGroup::NAME.eq("admins"))
        })
        .unwrap();
    assert_eq!(
        query.command_text().unwrap(),
        "SELECT Users.* FROM Users WHERE Users.Email LIKE @Param1 AND Users.Id IN (SELECT UserGroups.Id FROM UserGroups WHERE UserGroups.Name = @Param2)"
    );
    assert_eq!(query.parameters().get("Param1"), Some(&Value::from("%@corp.com")));
    assert_eq!(query.current_param_index(), 2);
}

#[test]
fn group_by_having() {
    let query = SqlBuilder::<User>::select(&mysql())
        .unwrap()
        .select_fields(User::ROLE)
        .unwrap()
        .select_aggregate("COUNT", User::ID)
        .unwrap()
        .group_by(User::ROLE)
        .unwrap()
        .having("COUNT", User::ID, BinaryOp::GreaterThan, 10)
        .unwrap();
    assert_eq!(
        query.command_text().unwrap(),
        "SELECT Users.Role, COUNT(Users.Id) FROM Users GROUP BY Users.Role HAVING COUNT(Users.Id) > @Param1"
    );
}

#[test]
fn insert_update_delete() {
    let ctx = mysql();
    let query = SqlBuilder::<User>::insert(
        &ctx,
        Expr::record([
            ("email", Expr::constant("a@b.c")),
            ("first_name", Expr::constant("Ann")),
        ]),
    )
    .unwrap();
    assert_eq!(
        query.command_text().unwrap(),
        "INSERT INTO Users (Email, FirstName) VALUES (@Param1, @Param2)"
    );
    assert_eq!(query.insert_target().unwrap(), "Users");

    let query = query.output(User::ID).unwrap();
    assert_eq!(
        query.command_text().unwrap(),
        "INSERT INTO Users (Email, FirstName) VALUES (@Param1, @Param2); SELECT LAST_INSERT_ID()"
    );

    let query = SqlBuilder::<User>::update(
        &ctx,
        Expr::record([
            ("email", User::EMAIL.expr().invoke("Replace", vec!["old.com".into(), "new.com".into()])),
            ("first_name", Expr::constant("Bob")),
        ]),
    )
    .unwrap()
    .filter(User::ID.eq(7))
    .unwrap();
    assert_eq!(
        query.command_text().unwrap(),
        "UPDATE Users SET Email = REPLACE(Email, @Param1, @Param2), FirstName = @Param3 WHERE Users.Id = @Param4"
    );

    let query = SqlBuilder::<User>::delete(&ctx)
        .unwrap()
        .filter(User::ROLE.eq(UserType::Guest))
        .unwrap();
    assert_eq!(
        query.command_text().unwrap(),
        "DELETE FROM Users WHERE Users.Role = @Param1"
    );
    assert!(query.where_command_text().unwrap_err().is_invalid_operation());
}

#[test]
fn postgres_dialect() {
    let ctx = SqlContext::for_dialect(Dialect::Postgres);
    let query = SqlBuilder::<User>::select(&ctx)
        .unwrap()
        .filter(User::EMAIL.starts_with("adm") & User::ID.gte(3))
        .unwrap()
        .order_by(User::ID)
        .unwrap()
        .page(2, 10);
    assert_eq!(
        query.command_text().unwrap(),
        r#"SELECT "Users".* FROM "Users" WHERE ("Users"."Email" LIKE $1 AND "Users"."Id" >= $2) ORDER BY "Users"."Id" LIMIT 10 OFFSET 20"#
    );
    assert_eq!(query.parameters().get("Param1"), Some(&Value::from("adm%")));
}

#[test]
fn missing_adapter_is_a_configuration_error() {
    let err = SqlBuilder::<User>::select(&SqlContext::new()).unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn unsupported_shapes_are_rejected() {
    let ctx = mysql();
    let err = SqlBuilder::<User>::select(&ctx)
        .unwrap()
        .filter(User::param())
        .unwrap_err();
    assert!(err.is_unsupported());

    let err = SqlBuilder::<User>::select(&ctx)
        .unwrap()
        .filter(User::ID.expr().add(1).eq(3))
        .unwrap_err();
    assert!(err.is_unsupported());
}

#[test]
fn comparisons_chain_on_composed_expressions() {
    let ctx = mysql();
    let query = SqlBuilder::<User>::select(&ctx)
        .unwrap()
        .filter(User::ID.expr().convert().gte(5))
        .unwrap()
        .filter(Expr::constant(2).add(3).lt(User::ID))
        .unwrap();
    assert_eq!(
        query.command_text().unwrap(),
        "SELECT Users.* FROM Users WHERE Users.Id >= @Param1 AND Users.Id > @Param2"
    );
    assert_eq!(query.parameters().get("Param2"), Some(&Value::Int(5)));
}
