use fsdb_example::models::{Meta, User};
use fsdb_example::store::DataCollection;

fn main() -> fsdb::Result<()> {
    env_logger::init();

    let data_dir = std::env::var("FSDB_DATA_DIR").unwrap_or_else(|_| "data".to_string());
    log::info!("Opening data directory: {data_dir}");
    let db = DataCollection::new(&data_dir);

    let users = db.group().users();
    users.save_user(
        "alice",
        &User {
            name: "Alice Chen".into(),
            email: "alice@example.com".into(),
        },
    )?;
    let alice = users.get_user("alice")?;
    log::info!("Loaded user {} <{}>", alice.name, alice.email);

    let apollo = db.projects().id("apollo");
    apollo.save_meta(
        "meta",
        &Meta {
            title: "Apollo".into(),
            tags: vec!["space".into()],
        },
    )?;
    apollo
        .attachments()
        .save_attachment_binary("readme.txt", b"hello")?;

    for project in db.projects().list_ids() {
        let project = db.projects().id(&project);
        let meta = match project.get_meta("meta") {
            Ok(meta) => meta,
            Err(e) => {
                log::warn!("Skipping {}: {e}", project.location().display());
                continue;
            }
        };
        log::info!(
            "Project {} has {} attachment(s)",
            meta.title,
            project.attachments().list_attachments().len()
        );
    }

    users.iterate_users(|record| -> fsdb::Result<()> {
        log::info!("{} last modified {}", record.id, record.modified_at);
        Ok(())
    })
}
