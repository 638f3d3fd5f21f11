use std::sync::Arc;

use crate::di::{Assembly, Container};
use crate::model::{ConsoleLogger, Database, Logger, MetricsPlugin, Plugin};

pub struct ServicesAssembly;

impl Assembly for ServicesAssembly {
    fn assemble(&self, container: &mut Container) {
        container.register::<Arc<dyn Logger>>(|_| Arc::new(ConsoleLogger));
        container.register_named::<Database>(|_| Database::connect("primary"), "primary");
        container.register_named::<Database>(|_| Database::connect("replica"), "read-replica");
        #[cfg(test)]
        container.register_named::<Database>(|_| Database::connect("fake"), "fake");
        container.register_into_collection::<Box<dyn Plugin>>(|_| Box::new(MetricsPlugin));
    }
}
