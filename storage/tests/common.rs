use testcontainers::{clients::Cli, core::WaitFor, images::generic::GenericImage, Container};
use xrpact_storage::pg::client::PgDatabaseClient;

pub struct PgContainer<'a> {
    pub client: PgDatabaseClient,

    // Owns container instance because when container is dropped, the
    // container is stopped.
    _container: Container<'a, GenericImage>,
}

// Starts a postgres instance via docker and connects a database client.
pub async fn setup_pg_container(
    docker_cli: &Cli,
) -> Result<PgContainer<'_>, Box<dyn std::error::Error>> {
    let db = "postgres-db-test";
    let user = "postgres-user-test";
    let password = "postgres-password-test";

    let generic_postgres = GenericImage::new("postgres", "14-alpine")
        .with_wait_for(WaitFor::message_on_stderr(
            "database system is ready to accept connections",
        ))
        .with_env_var("POSTGRES_DB", db)
        .with_env_var("POSTGRES_USER", user)
        .with_env_var("POSTGRES_PASSWORD", password);

    let container = docker_cli.run(generic_postgres);

    let postgres_uri = format!(
        "postgres://{}:{}@localhost:{}/{}?sslmode=disable",
        user,
        password,
        container.get_host_port_ipv4(5432),
        db
    );

    let client = PgDatabaseClient::connect(postgres_uri).await?;

    // Run migrations to setup initial tables:
    client.run_migrations().await?;

    Ok(PgContainer {
        client,
        _container: container,
    })
}
