use resource_import_core::db::open_db_in_memory;
use resource_import_core::{
    CatalogRepository, RepoError, Resource, ResourceDescriptor, SqliteCatalogRepository,
};
use rusqlite::Connection;

fn sample_resource(repo: &mut SqliteCatalogRepository<'_>, url: &str) -> Resource {
    let category = repo.ensure_category("Books").unwrap();
    let languages = vec![
        repo.ensure_language("Rust").unwrap(),
        repo.ensure_language("C").unwrap(),
    ];
    let mut descriptor = ResourceDescriptor::new("The Book", url, "Books");
    descriptor.paid = Some(false);
    descriptor.notes = "free online".to_string();
    descriptor.upvotes = 3;
    Resource::from_descriptor(&descriptor, category, languages)
}

#[test]
fn try_new_rejects_unmigrated_connection() {
    let mut conn = Connection::open_in_memory().unwrap();
    let err = SqliteCatalogRepository::try_new(&mut conn).err().unwrap();
    assert!(matches!(err, RepoError::MissingRequiredTable("categories")));
}

#[test]
fn ensure_lookup_entities_is_idempotent_by_name() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteCatalogRepository::try_new(&mut conn).unwrap();

    let first = repo.ensure_category("Books").unwrap();
    let second = repo.ensure_category("Books").unwrap();
    assert_eq!(first, second);

    let go = repo.ensure_language("Go").unwrap();
    assert_eq!(repo.ensure_language("Go").unwrap().id, go.id);

    assert_eq!(repo.list_categories().unwrap().len(), 1);
    assert_eq!(repo.list_languages().unwrap().len(), 1);
}

#[test]
fn insert_and_read_back_preserves_fields_and_language_order() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteCatalogRepository::try_new(&mut conn).unwrap();
    let resource = sample_resource(&mut repo, "https://doc.rust-lang.org/book");

    repo.insert_resource(&resource).unwrap();

    let loaded = repo
        .get_resource_by_url("https://doc.rust-lang.org/book")
        .unwrap()
        .unwrap();
    assert_eq!(loaded, resource);
    let names: Vec<&str> = loaded.languages.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["Rust", "C"]);

    let all = repo.list_resources().unwrap();
    assert_eq!(all, vec![resource]);
}

#[test]
fn missing_url_reads_as_none() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteCatalogRepository::try_new(&mut conn).unwrap();
    assert!(repo.get_resource_by_url("http://nowhere").unwrap().is_none());
}

#[test]
fn update_rewrites_mutable_fields_but_not_counters() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteCatalogRepository::try_new(&mut conn).unwrap();
    let mut resource = sample_resource(&mut repo, "http://a");
    repo.insert_resource(&resource).unwrap();

    resource.name = "Renamed".to_string();
    resource.paid = None;
    resource.languages = vec![repo.ensure_language("Go").unwrap()];
    resource.upvotes = 1000;
    repo.update_resource(&resource).unwrap();

    let loaded = repo.get_resource_by_url("http://a").unwrap().unwrap();
    assert_eq!(loaded.name, "Renamed");
    assert_eq!(loaded.paid, None);
    assert_eq!(loaded.languages.len(), 1);
    assert_eq!(loaded.languages[0].name, "Go");
    assert_eq!(loaded.upvotes, 3);
}

#[test]
fn update_unknown_resource_returns_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteCatalogRepository::try_new(&mut conn).unwrap();
    let resource = sample_resource(&mut repo, "http://missing");

    let err = repo.update_resource(&resource).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == resource.uuid));
}

#[test]
fn failed_insert_rolls_back_resource_and_links() {
    let mut conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TRIGGER reject_links BEFORE INSERT ON resource_languages
         WHEN NEW.position = 1
         BEGIN
            SELECT RAISE(ABORT, 'injected link failure');
         END;",
    )
    .unwrap();

    {
        let mut repo = SqliteCatalogRepository::try_new(&mut conn).unwrap();
        let resource = sample_resource(&mut repo, "http://a");
        let err = repo.insert_resource(&resource).unwrap_err();
        assert!(err.to_string().contains("injected link failure"));
    }

    let resources: i64 = conn
        .query_row("SELECT COUNT(*) FROM resources;", [], |row| row.get(0))
        .unwrap();
    let links: i64 = conn
        .query_row("SELECT COUNT(*) FROM resource_languages;", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(resources, 0);
    assert_eq!(links, 0);
}

#[test]
fn list_resources_rejects_invalid_paid_value() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let mut repo = SqliteCatalogRepository::try_new(&mut conn).unwrap();
        let resource = sample_resource(&mut repo, "http://a");
        repo.insert_resource(&resource).unwrap();
    }
    conn.execute_batch(
        "PRAGMA ignore_check_constraints = ON;
         UPDATE resources SET paid = 7;",
    )
    .unwrap();

    let repo = SqliteCatalogRepository::try_new(&mut conn).unwrap();
    let err = repo.list_resources().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}
