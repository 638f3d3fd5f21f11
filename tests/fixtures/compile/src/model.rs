pub trait Logger {
    fn log(&self, message: &str) -> String;
}

pub struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, message: &str) -> String {
        format!("console: {message}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Database {
    pub name: String,
}

impl Database {
    pub fn connect(name: &str) -> Self {
        Database {
            name: name.to_string(),
        }
    }
}

pub trait Plugin {
    fn name(&self) -> &'static str;
}

pub struct MetricsPlugin;

impl Plugin for MetricsPlugin {
    fn name(&self) -> &'static str {
        "metrics"
    }
}
