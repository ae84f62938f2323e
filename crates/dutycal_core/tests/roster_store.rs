use dutycal_core::db::open_db_in_memory;
use dutycal_core::repo::duty_repo::{DutyRepository, SqliteDutyRepository};
use dutycal_core::repo::rubric_repo::{RubricRepository, SqliteRubricRepository};
use dutycal_core::repo::user_repo::{SqliteUserRepository, UserRepository};
use dutycal_core::{CalendarDate, Duty, RepoError, User, UserRole};

fn date(value: &str) -> CalendarDate {
    CalendarDate::parse(value).unwrap()
}

fn user(name: &str, email: &str) -> User {
    User::new(name, email, "555-0100", UserRole::User)
}

#[test]
fn user_crud_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    let mut alice = user("Alice", "alice@example.com");
    repo.create_user(&alice).unwrap();
    assert_eq!(repo.get_user(alice.id).unwrap(), Some(alice.clone()));
    assert_eq!(
        repo.find_user_by_email(" alice@example.com ").unwrap(),
        Some(alice.clone())
    );

    alice.role = UserRole::Admin;
    repo.update_user(&alice).unwrap();
    assert!(repo.get_user(alice.id).unwrap().unwrap().is_admin());

    repo.delete_user(alice.id).unwrap();
    assert_eq!(repo.get_user(alice.id).unwrap(), None);
    assert!(matches!(
        repo.delete_user(alice.id),
        Err(RepoError::UserNotFound(_))
    ));
}

#[test]
fn duplicate_email_is_a_conflict() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();
    repo.create_user(&user("Alice", "alice@example.com"))
        .unwrap();

    let err = repo
        .create_user(&user("Alice Two", "alice@example.com"))
        .unwrap_err();
    assert!(matches!(err, RepoError::Conflict(_)));
}

#[test]
fn invalid_users_are_rejected_before_sql() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    assert!(matches!(
        repo.create_user(&user("  ", "blank@example.com")),
        Err(RepoError::Validation(_))
    ));
    assert!(matches!(
        repo.create_user(&user("Bob", "bob.example.com")),
        Err(RepoError::Validation(_))
    ));
    assert!(repo.list_users().unwrap().is_empty());
}

#[test]
fn users_list_in_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();
    let names = ["Zoe", "Adam", "Mia"];
    for name in names {
        repo.create_user(&user(name, &format!("{}@example.com", name.to_lowercase())))
            .unwrap();
    }

    let listed: Vec<_> = repo
        .list_users()
        .unwrap()
        .into_iter()
        .map(|user| user.name)
        .collect();
    assert_eq!(listed, names);
}

#[test]
fn rubric_create_rename_delete() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteRubricRepository::try_new(&conn).unwrap();

    assert_eq!(repo.create_rubric("  Escalation ").unwrap(), "Escalation");
    assert!(matches!(
        repo.create_rubric("Escalation"),
        Err(RepoError::Conflict(_))
    ));
    assert!(matches!(
        repo.create_rubric(""),
        Err(RepoError::Validation(_))
    ));

    assert_eq!(repo.rename_rubric("Escalation", "Incident").unwrap(), 0);
    let rubrics = repo.list_rubrics().unwrap();
    assert_eq!(rubrics.last().map(String::as_str), Some("Incident"));

    assert!(matches!(
        repo.rename_rubric("Incident", "Support"),
        Err(RepoError::Conflict(_))
    ));
    assert!(matches!(
        repo.rename_rubric("Missing", "Other"),
        Err(RepoError::RubricNotFound(_))
    ));

    repo.delete_rubric("Incident").unwrap();
    assert!(matches!(
        repo.delete_rubric("Incident"),
        Err(RepoError::RubricNotFound(_))
    ));
}

#[test]
fn rubric_rename_moves_referencing_duties_only() {
    let conn = open_db_in_memory().unwrap();
    let users = SqliteUserRepository::try_new(&conn).unwrap();
    let rubrics = SqliteRubricRepository::try_new(&conn).unwrap();
    let duties = SqliteDutyRepository::try_new(&conn).unwrap();

    let alice = user("Alice", "alice@example.com");
    users.create_user(&alice).unwrap();
    let support = Duty::new(alice.id, "Support", date("2024-04-15"));
    let ops = Duty::new(alice.id, "Operations", date("2024-04-15"));
    duties.create_duty(&support).unwrap();
    duties.create_duty(&ops).unwrap();

    assert!(rubrics.rubric_in_use("Support").unwrap());
    assert_eq!(rubrics.rename_rubric("Support", "Help Desk").unwrap(), 1);
    assert!(!rubrics.rubric_in_use("Support").unwrap());

    assert_eq!(duties.get_duty(support.id).unwrap().unwrap().rubric, "Help Desk");
    assert_eq!(duties.get_duty(ops.id).unwrap().unwrap().rubric, "Operations");
}

#[test]
fn duty_crud_and_joined_listing() {
    let conn = open_db_in_memory().unwrap();
    let users = SqliteUserRepository::try_new(&conn).unwrap();
    let duties = SqliteDutyRepository::try_new(&conn).unwrap();

    let alice = user("Alice", "alice@example.com");
    let bob = user("Bob", "bob@example.com");
    users.create_user(&alice).unwrap();
    users.create_user(&bob).unwrap();

    let mut first = Duty::new(bob.id, "Support", date("2024-04-16"));
    let second = Duty::new(alice.id, "Operations", date("2024-04-15"));
    duties.create_duty(&first).unwrap();
    duties.create_duty(&second).unwrap();

    let listed = duties.list_duties_with_users().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id(), first.id);
    assert_eq!(listed[0].user, bob);
    assert_eq!(listed[1].user.name, "Alice");

    first.user_id = alice.id;
    first.date = date("2024-04-20");
    duties.update_duty(&first).unwrap();
    let reloaded = duties.get_duty(first.id).unwrap().unwrap();
    assert_eq!(reloaded, first);

    duties.delete_duty(first.id).unwrap();
    assert!(matches!(
        duties.delete_duty(first.id),
        Err(RepoError::DutyNotFound(_))
    ));
    assert_eq!(duties.list_duties_with_users().unwrap().len(), 1);
}

#[test]
fn duty_for_missing_user_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let duties = SqliteDutyRepository::try_new(&conn).unwrap();

    let ghost = user("Ghost", "ghost@example.com");
    let duty = Duty::new(ghost.id, "Support", date("2024-04-15"));
    assert!(matches!(
        duties.create_duty(&duty),
        Err(RepoError::UserNotFound(id)) if id == ghost.id
    ));
    assert!(matches!(
        duties.update_duty(&duty),
        Err(RepoError::UserNotFound(_))
    ));
}

#[test]
fn corrupt_persisted_date_is_reported_not_masked() {
    let conn = open_db_in_memory().unwrap();
    let users = SqliteUserRepository::try_new(&conn).unwrap();
    let duties = SqliteDutyRepository::try_new(&conn).unwrap();
    let alice = user("Alice", "alice@example.com");
    users.create_user(&alice).unwrap();

    conn.execute(
        "INSERT INTO duties (id, user_id, rubric, date) VALUES (?1, ?2, 'Support', '2024-02-30');",
        [uuid::Uuid::new_v4().to_string(), alice.id.to_string()],
    )
    .unwrap();

    let err = duties.list_duties_with_users().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn deleting_user_cascades_to_duties() {
    let conn = open_db_in_memory().unwrap();
    let users = SqliteUserRepository::try_new(&conn).unwrap();
    let duties = SqliteDutyRepository::try_new(&conn).unwrap();
    let alice = user("Alice", "alice@example.com");
    users.create_user(&alice).unwrap();
    duties
        .create_duty(&Duty::new(alice.id, "Support", date("2024-04-15")))
        .unwrap();

    users.delete_user(alice.id).unwrap();
    assert!(duties.list_duties_with_users().unwrap().is_empty());
}
