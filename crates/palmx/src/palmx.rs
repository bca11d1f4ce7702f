use std::io::Write;

/// Engine bootstrap. Creating the first instance sets up logging for the
/// process; later instances reuse it.
pub struct Palmx {
    app_name: String,
}

static PALMX_STATIC: std::sync::OnceLock<PalmxStatic> = std::sync::OnceLock::new();

struct PalmxStatic {}

impl PalmxStatic {
    fn init(app_name: &str) -> &'static Self {
        palmx_profiling::profile_function!();

        PALMX_STATIC.get_or_init(|| {
            let logger = env_logger::builder()
                .filter_level(log::LevelFilter::Info)
                .filter_module("wgpu_core", log::LevelFilter::Warn)
                .filter_module("wgpu_hal", log::LevelFilter::Warn)
                .filter_module("naga", log::LevelFilter::Warn)
                .parse_default_env()
                .format(|buf, record| {
                    writeln!(
                        buf,
                        "[{} {}:{}] {}",
                        record.level(),
                        record.file().unwrap_or("unknown"),
                        record.line().unwrap_or(0),
                        record.args()
                    )
                })
                .try_init();

            match logger {
                Ok(()) => log::info!("Starting {}", app_name),
                Err(error) => eprintln!("Logging is already set up: {}", error),
            }

            Self {}
        })
    }
}

impl Palmx {
    pub fn new(app_name: &str) -> Self {
        PalmxStatic::init(app_name);

        Self {
            app_name: app_name.to_owned(),
        }
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }
}
