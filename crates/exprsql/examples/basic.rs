//! Build a few queries and print the SQL with its parameters.
//!
//! Run with: `cargo run -p exprsql --example basic`

use exprsql::{
    BinaryOp, Dialect, Entity, Expr, SqlBuildResult, SqlBuilder, SqlBuilderCollection, SqlConfig,
    SqlContext, SqlEnum,
};

#[derive(Entity)]
#[sql(table = "Users", rename_all = "PascalCase")]
#[allow(dead_code)]
struct User {
    id: i64,
    email: String,
    role: i64,
    group_id: i64,
}

#[derive(Entity)]
#[sql(table = "UserGroups", rename_all = "PascalCase")]
#[allow(dead_code)]
struct UserGroup {
    id: i64,
    name: String,
}

#[derive(Clone, Copy, SqlEnum)]
#[allow(dead_code)]
enum Role {
    Guest = 1,
    Admin = 2,
}

fn print(label: &str, sql: String, params: &exprsql::Parameters) {
    println!("-- {label}");
    println!("{sql}");
    for (name, value) in params {
        println!("   {name} = {value}");
    }
    println!();
}

fn main() -> SqlBuildResult<()> {
    let config = SqlConfig::from_toml_str(
        r#"
        dialect = "mysql"
        "#,
    )?;
    let ctx: SqlContext = config.into();

    let query = SqlBuilder::<User>::select(&ctx)?
        .filter(User::EMAIL.ends_with("@example.com") & !User::ROLE.eq(Role::Guest))?
        .left_join::<UserGroup>(User::GROUP_ID.eq_field(UserGroup::ID))?
        .select_fields(Expr::record([
            ("Id", User::ID.expr()),
            ("Email", User::EMAIL.expr()),
            ("GroupName", UserGroup::NAME.expr()),
        ]))?
        .order_by_desc(User::ID)?
        .page(1, 20);
    print("select", query.command_text()?, query.parameters());

    let query = SqlBuilder::<User>::select(&ctx)?
        .select_fields(User::ROLE)?
        .select_aggregate("COUNT", User::ID)?
        .group_by(User::ROLE)?
        .having("COUNT", User::ID, BinaryOp::GreaterThan, 5)?;
    print("group by", query.command_text()?, query.parameters());

    let query = SqlBuilder::<User>::update(
        &ctx,
        Expr::record([(
            "email",
            User::EMAIL
                .expr()
                .invoke("Replace", vec!["@old.com".into(), "@new.com".into()]),
        )]),
    )?
    .filter(User::ROLE.eq(Role::Admin))?;
    print("update", query.command_text()?, query.parameters());

    let mut batch = SqlBuilderCollection::new(&ctx);
    batch
        .count::<User>(|q| q.filter(User::ID.gt(100)))?
        .delete::<UserGroup>(|q| q.filter_in(UserGroup::ID, [3, 4]))?;
    print("batch", batch.command_text()?, &batch.parameters());

    let pg = SqlContext::for_dialect(Dialect::Postgres);
    let query = SqlBuilder::<User>::select(&pg)?
        .filter(User::EMAIL.contains("admin"))?
        .take(5);
    print("postgres", query.command_text()?, query.parameters());

    Ok(())
}
