use crate::cli::ServeArgs;
use crate::infra::{AppState, ClinicStores};
use crate::routes::with_clinic_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use petclinic::clinic::SystemClock;
use petclinic::config::AppConfig;
use petclinic::error::AppError;
use petclinic::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if args.no_seed {
        config.clinic.seed_sample_data = false;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let stores = if config.clinic.seed_sample_data {
        ClinicStores::sample()?
    } else {
        ClinicStores::default()
    };
    let clinic_state = stores.clinic_state(Arc::new(SystemClock));

    let app = with_clinic_routes(clinic_state)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        seeded = config.clinic.seed_sample_data,
        "pet clinic service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
