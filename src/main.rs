use desk_calendar::app_logic::CalendarController;
use desk_calendar::app_logic::handler::APP_NAME;
use desk_calendar::core::date_utils::{local_now, sunday_on_or_before};
use desk_calendar::core::{AppSettings, ConfigManagerOperations, CoreConfigManager, CoreEventStore};
use simplelog::{
    ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger,
};
use std::fs::{self, File};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

const LOG_FILE_NAME: &str = "calendar.log";

/*
 * Logs to the terminal and to `calendar.log` in the data directory. If the
 * log file cannot be created, terminal logging still goes ahead.
 */
fn initialize_logging(settings: &AppSettings, data_dir: &Path) {
    let level = settings.log_level.to_level_filter();
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];

    let log_path = data_dir.join(LOG_FILE_NAME);
    match fs::create_dir_all(data_dir).and_then(|_| File::create(&log_path)) {
        Ok(file) => loggers.push(WriteLogger::new(level, Config::default(), file)),
        Err(e) => eprintln!("Could not open log file {}: {e}", log_path.display()),
    }

    if let Err(e) = CombinedLogger::init(loggers) {
        eprintln!("Failed to initialize logging: {e}");
    }
}

/*
 * Headless launcher: loads settings and the persisted calendar, then prints
 * the current week and the upcoming-events notification.
 */
fn main() -> ExitCode {
    let config_manager = CoreConfigManager::new();
    let settings = config_manager.load_settings(APP_NAME).unwrap_or_else(|e| {
        eprintln!("Could not load settings, using defaults: {e}");
        AppSettings::default()
    });

    let Some(data_dir) = settings.resolve_data_dir(APP_NAME) else {
        eprintln!("Could not determine a data directory for {APP_NAME}.");
        return ExitCode::FAILURE;
    };
    initialize_logging(&settings, &data_dir);
    log::info!("{APP_NAME}: Using data directory {data_dir:?}");

    let event_store = Arc::new(CoreEventStore::new(&data_dir));
    let now = local_now();
    let controller = CalendarController::new(event_store, &settings, now.date());
    log::info!(
        "{APP_NAME}: Loaded {} events; view {:?}/{:?} from {} to {}.",
        controller.events().len(),
        controller.mode(),
        controller.scale(),
        controller.start_of_range(),
        controller.end_of_range()
    );

    log::debug!(
        "{APP_NAME}: Default backup location is {:?}",
        controller.default_backup_path()
    );

    let week_start = sunday_on_or_before(now.date()).unwrap_or(now.date());
    let reports = controller
        .week_list_view(week_start)
        .and_then(|week| Ok((week, controller.notification_summary(now)?)));
    match reports {
        Ok((week, notification)) => {
            println!("{week}");
            println!("{notification}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{APP_NAME}: Failed to render reports: {e}");
            ExitCode::FAILURE
        }
    }
}
