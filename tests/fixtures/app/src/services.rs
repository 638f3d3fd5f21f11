use std::sync::Arc;

use crate::di::{Assembly, Container};

pub struct ServicesAssembly;

impl Assembly for ServicesAssembly {
    fn assemble(&self, container: &mut Container) {
        container.register::<Arc<dyn Logger>>(|_| Arc::new(ConsoleLogger));
        container.register_named::<Database>(|_| Database::connect("primary"), "primary");
        container.register_named::<Database>(|_| Database::connect("replica"), "read-replica");
        container.register::<Widget, (String,)>(|r, label: String| Widget::make(r, label));
        #[cfg(feature = "metrics")]
        container.register_into_collection::<Box<dyn Plugin>>(|_| Box::new(MetricsPlugin));
    }
}
