use std::env;

use actix_files::Files;
use actix_web::{web, App, HttpServer};
use handlebars::Handlebars;
use listenfd::ListenFd;
use log::info;

use collegeforces::college::CollegeMatcher;
use collegeforces::dashboard;
use collegeforces::setup;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    setup::setup_dotenv();
    env_logger::init();

    let pool = setup::create_pool();
    {
        let connection = pool.get().expect("Couldn't get a connection from the pool");
        setup::create_schema(&connection).expect("Couldn't create the schema");
    }

    let mut handlebars = Handlebars::new();
    handlebars
        .register_templates_directory(".hbs", "./templates")
        .expect("Couldn't register the templates directory");
    let handlebars = web::Data::new(handlebars);
    let pool = web::Data::new(pool);
    let matcher = web::Data::new(CollegeMatcher::with_default_rules());

    let mut listenfd = ListenFd::from_env();
    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(handlebars.clone())
            .app_data(pool.clone())
            .app_data(matcher.clone())
            .service(Files::new("/static", "./static"))
            .route("/", web::get().to(dashboard::index))
            .route("/rankings", web::get().to(dashboard::rankings))
            .route("/colleges", web::get().to(dashboard::colleges))
            .route("/api/rankings", web::get().to(dashboard::rankings_json))
            .route("/api/colleges", web::get().to(dashboard::colleges_json))
    });

    server = match listenfd.take_tcp_listener(0)? {
        Some(listener) => server.listen(listener)?,
        None => {
            let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".into());
            info!("Binding to {}", bind_addr);
            server.bind(bind_addr)?
        }
    };

    server.run().await
}
