use crate::{
    api::{attendance, employee, health},
    config::Config,
};
use actix_governor::{Governor, GovernorConfigBuilder, PeerIpKeyExtractor};
use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    // One per-IP limiter shared by the record-keeping routes. Health stays
    // outside it so probes are never shed.
    let requests_per_min = config.rate_api_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let governor_conf = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap();

    cfg.service(web::resource("/health").route(web::get().to(health::health)));

    cfg.service(
        web::scope("/employees")
            .wrap(Governor::new(&governor_conf))
            // /employees
            .service(
                web::resource("")
                    .route(web::post().to(employee::create_employee))
                    .route(web::get().to(employee::list_employees)),
            )
            // /employees/{id}/summary
            .service(
                web::resource("/{id}/summary")
                    .route(web::get().to(employee::employee_summary)),
            )
            // /employees/{id}
            .service(
                web::resource("/{id}").route(web::delete().to(employee::delete_employee)),
            ),
    );

    cfg.service(
        web::scope("/attendance")
            .wrap(Governor::new(&governor_conf))
            // /attendance
            .service(
                web::resource("")
                    .route(web::post().to(attendance::create_attendance))
                    .route(web::get().to(attendance::list_attendance)),
            ),
    );
}
