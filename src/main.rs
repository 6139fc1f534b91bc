use groupoverview::{
    backup::{self, BackupSettings},
    config::Config,
    db::{self, IDType},
    directory::CourseGroups,
    view::{CourseIndex, OverviewPage},
    log_error, log_info,
};

const USAGE: &str = "usage: groupoverview [config.json] (show <overview-id> | export <overview-id> | list <course-id>)";

trait ResultLog {
    type OkType;
    fn expect_log(self, msg: &str) -> Self::OkType;
}
impl<T, S: AsRef<str>> ResultLog for Result<T, S> {
    type OkType=T;
    fn expect_log(self, msg: &str) -> T {
        match self {
            Ok(v) => v,
            Err(e) if msg.is_empty() => panic!("{}", e.as_ref()),
            Err(e) => panic!("{}: {}", msg, e.as_ref()),
        } 
    }
}

fn parse_id(value: &str) -> Result<IDType, String> {
    value.parse().map_err(|_| format!("Not an id: {}\n{}", value, USAGE))
}

async fn run(db: &sea_orm::DatabaseConnection, config: &Config, args: &[String]) -> Result<String, String> {
    let groups = CourseGroups::new(db);
    match args {
        [command, id] if command == "show" => {
            let page = OverviewPage::build(db, &groups, parse_id(id)?).await.map_err(|e| e.to_string())?;
            serde_json::to_string_pretty(&page).map_err(|e| e.to_string())
        }
        [command, id] if command == "export" => {
            let settings = BackupSettings { groups: config.backup_groups };
            let tree = backup::export_overview(db, parse_id(id)?, settings).await.map_err(|e| e.to_string())?;
            tree.to_json().map_err(|e| e.to_string())
        }
        [command, id] if command == "list" => {
            let index = CourseIndex::build(db, parse_id(id)?).await.map_err(|e| e.to_string())?;
            serde_json::to_string_pretty(&index).map_err(|e| e.to_string())
        }
        _ => Err(USAGE.to_string()),
    }
}

#[tokio::main]
async fn main() {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let config_path = match args.first() {
        Some(path) if path.ends_with(".json") || path.ends_with(".yaml") || path.ends_with(".yml") => args.remove(0),
        _ => "./config.json".to_string(),
    };
    let config = Config::load(&config_path).expect_log("Could not load the configuration file");
    let level = config.log_level().expect_log("Invalid configuration");
    groupoverview::log::init(level).map_err(|e| e.to_string()).expect_log("Could not install the logger");
    let db = db::start_db(&config.database_url).await.map_err(|e| e.to_string()).expect_log("Could not open the database");
    log_info!("Database {} ready", config.database_url);
    match run(&db, &config, &args).await {
        Ok(output) => println!("{}", output),
        Err(e) => {
            log_error!("{}", e);
            std::process::exit(1);
        }
    }
}
