use std::net::TcpListener;

use actix_web::{dev::Server, web, App, HttpServer};
use anyhow::Context;
use diesel::{pg::Pg, r2d2::ConnectionManager, PgConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use r2d2::Pool;
use tracing_actix_web::TracingLogger;

use crate::{
    auth::jwt::Tokenizer,
    configuration::{DatabaseSettings, Settings, SuperadminSettings},
    db_interaction::user::{ensure_superadmin, NewUser},
    password::compute_password_hash,
    routes::*,
    telemetry::spawn_blocking_with_tracing,
    utils::{get_pooled_connection, DbPool},
};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

pub struct Application {
    pub host: String,
    pub port: u16,
    pub server: Server,
}

pub fn get_connection_pool(settings: &DatabaseSettings) -> DbPool {
    Pool::builder()
        .max_size(settings.max_connections)
        .build_unchecked(ConnectionManager::<PgConnection>::new(
            settings.get_database_table_url(),
        ))
}

fn run_migrations(connection: &mut impl MigrationHarness<Pg>) -> Result<(), anyhow::Error> {
    connection
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;
    Ok(())
}

#[tracing::instrument("Seeding superadmin", skip(pool, settings), fields(email = %settings.email))]
async fn seed_superadmin(pool: &web::Data<DbPool>, settings: SuperadminSettings) -> Result<(), anyhow::Error> {
    let password_hash = spawn_blocking_with_tracing(move || compute_password_hash(settings.password))
        .await
        .context("Failed due to threadpool error")??;

    let conn = get_pooled_connection(pool).await?;
    let created = ensure_superadmin(
        conn,
        NewUser {
            name: settings.name,
            email: settings.email,
            password_hash,
            phone_number: None,
        },
    )
    .await?;

    if created {
        tracing::info!("Superadmin account created");
    }
    Ok(())
}

impl Application {
    pub async fn new(settings: Settings) -> Result<Self, anyhow::Error> {
        let pool = get_connection_pool(&settings.database);

        if settings.database.run_migrations {
            let migration_pool = pool.clone();
            spawn_blocking_with_tracing(move || {
                let mut conn = migration_pool
                    .get()
                    .context("Failed to get connection for migrations")?;
                run_migrations(&mut conn)
            })
            .await
            .context("Failed due to threadpool error")??;
        }

        let pool = web::Data::new(pool);
        if let Some(superadmin) = settings.superadmin {
            seed_superadmin(&pool, superadmin).await?;
        }

        let tokenizer = web::Data::new(Tokenizer::new(&settings.jwt));

        let listener = TcpListener::bind((
            settings.application.host.as_str(),
            settings.application.port,
        ))?;
        let port = listener.local_addr()?.port();

        let server = run(listener, pool, tokenizer)?;

        Ok(Application {
            host: settings.application.host,
            port,
            server,
        })
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

// Extractor failures are reported in the same {"error": ...} shape as handler errors
fn extractor_configs(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default().error_handler(|err, _req| ApiError::bad_request(err).into()),
    )
    .app_data(
        web::QueryConfig::default().error_handler(|err, _req| ApiError::bad_request(err).into()),
    )
    .app_data(
        web::PathConfig::default().error_handler(|err, _req| ApiError::bad_request(err).into()),
    );
}

fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/register", web::post().to(register))
        .route("/login", web::post().to(login))
        .route("/profile", web::get().to(get_profile))
        .route("/profile", web::patch().to(update_profile))
        .route("/account-requests", web::post().to(post_account_request))
        .service(
            web::scope("/admin")
                .route("/account-requests", web::get().to(get_account_requests))
                .route("/account-requests/{request_id}/approve", web::post().to(approve_request))
                .route("/account-requests/{request_id}/reject", web::post().to(reject_request))
                .route("/shops", web::get().to(get_all_shops))
                .route("/shops/{shop_id}", web::delete().to(remove_shop))
                .route("/owners", web::get().to(get_owners))
                .route("/owners/{owner_id}", web::delete().to(remove_owner))
                .route("/audit-logs", web::get().to(get_audit_logs)),
        )
        .route("/shops", web::get().to(get_shops))
        .route("/shops/{shop_id}", web::get().to(get_shop_by_id))
        .route("/shops/{shop_id}", web::patch().to(patch_shop))
        .route("/shops/{shop_id}/branches", web::get().to(get_branches))
        .route("/shops/{shop_id}/branches", web::post().to(post_branch))
        .route("/shops/{shop_id}/services", web::get().to(get_services))
        .route("/shops/{shop_id}/services", web::post().to(post_service))
        .route("/shops/{shop_id}/detergents", web::get().to(get_detergents))
        .route("/shops/{shop_id}/detergents", web::post().to(post_detergent))
        .route("/services/{service_id}", web::patch().to(patch_service))
        .route("/services/{service_id}", web::delete().to(remove_service))
        .route("/detergents/{detergent_type_id}", web::patch().to(patch_detergent))
        .route("/detergents/{detergent_type_id}", web::delete().to(remove_detergent))
        .route("/branches/{branch_id}", web::get().to(get_branch_by_id))
        .route("/branches/{branch_id}", web::patch().to(patch_branch))
        .route("/branches/{branch_id}", web::delete().to(remove_branch))
        .route("/branches/{branch_id}/hours", web::get().to(get_hours))
        .route("/branches/{branch_id}/hours", web::put().to(put_hours))
        .route("/branches/{branch_id}/staff", web::get().to(get_staff))
        .route("/branches/{branch_id}/staff", web::post().to(post_staff))
        .route("/branches/{branch_id}/staff/{user_id}", web::delete().to(delete_staff))
        .route("/branches/{branch_id}/detergents", web::get().to(get_branch_detergents))
        .route(
            "/branches/{branch_id}/detergents/{detergent_type_id}/price",
            web::put().to(put_branch_price),
        )
        .route(
            "/branches/{branch_id}/detergents/{detergent_type_id}/price",
            web::delete().to(delete_branch_price),
        )
        .route("/branches/{branch_id}/orders", web::get().to(get_branch_orders))
        .route("/branches/{branch_id}/orders", web::post().to(post_order))
        // Registered before /orders/{order_id} so "mine" is not parsed as an id
        .route("/orders/mine", web::get().to(get_my_orders))
        .route("/orders/{order_id}", web::get().to(get_order_by_id))
        .route("/orders/{order_id}/accept", web::post().to(post_accept_order))
        .route("/orders/{order_id}/advance", web::post().to(post_advance_order))
        .route("/delivery/orders", web::get().to(get_delivery_orders));
}

pub fn run(
    listener: TcpListener,
    pool: web::Data<DbPool>,
    tokenizer: web::Data<Tokenizer>,
) -> Result<Server, anyhow::Error> {
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(pool.clone())
            .app_data(tokenizer.clone())
            .configure(extractor_configs)
            .configure(configure_routes)
    })
    .listen(listener)?
    .run();

    Ok(server)
}
