#[cfg(feature = "ssr")]
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    use actix_files::Files;
    use actix_web::*;
    use leptos::logging::log;
    use leptos::*;
    use leptos_actix::{generate_route_list, LeptosRoutes};
    use product_review_manager::api;
    use product_review_manager::app::*;
    use product_review_manager::config::Config;
    use product_review_manager::db::Database;
    use product_review_manager::state::AppState;

    let config = Config::from_env();

    // Initialize the database
    let db = Database::new(&config.db_path).map_err(io_error)?;
    db.create_schema().await.map_err(io_error)?;
    log!("[SERVER] Schema ready at {}", config.db_path);
    let state = web::Data::new(AppState::new(db, config));

    // Load configuration
    let conf = get_configuration(None).await.map_err(io_error)?;
    let addr = conf.leptos_options.site_addr;

    // Generate the list of routes in your Leptos App
    let routes = generate_route_list(AdminApp);
    log!("[SERVER] listening on http://{}", &addr);

    HttpServer::new(move || {
        let leptos_options = &conf.leptos_options;
        let site_root = &leptos_options.site_root;

        App::new()
            .app_data(state.clone())
            // REST routes BEFORE Leptos server functions
            .configure(api::configure)
            .route("/api/{tail:.*}", leptos_actix::handle_server_fns())
            // Serve JS/WASM/CSS from `pkg`
            .service(Files::new("/pkg", format!("{site_root}/pkg")))
            .service(favicon)
            .leptos_routes(leptos_options.to_owned(), routes.to_owned(), AdminApp)
            .app_data(web::Data::new(leptos_options.to_owned()))
    })
    .bind(&addr)?
    .run()
    .await
}

#[cfg(feature = "ssr")]
fn io_error(err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
}

#[cfg(feature = "ssr")]
#[actix_web::get("favicon.ico")]
async fn favicon(
    leptos_options: actix_web::web::Data<leptos::LeptosOptions>,
) -> actix_web::Result<actix_files::NamedFile> {
    let leptos_options = leptos_options.into_inner();
    let site_root = &leptos_options.site_root;
    Ok(actix_files::NamedFile::open(format!(
        "{site_root}/favicon.ico"
    ))?)
}

#[cfg(not(any(feature = "ssr", feature = "csr")))]
pub fn main() {
    // no client-side main function
    // see lib.rs for hydration function instead
}

#[cfg(all(not(feature = "ssr"), feature = "csr"))]
pub fn main() {
    // to run: `trunk serve --open --features csr`
    use product_review_manager::app::*;

    console_error_panic_hook::set_once();

    leptos::mount_to_body(AdminApp);
}
