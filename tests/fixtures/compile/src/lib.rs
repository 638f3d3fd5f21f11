pub mod di;
pub mod generated;
pub mod model;
pub mod services;
pub mod widgets;

#[cfg(test)]
mod tests {
    use crate::di::Container;
    use crate::generated::services_generated::{DatabaseKey, ServicesAssemblyResolver};
    use crate::services::ServicesAssembly;
    use crate::widgets::inner::Gadget;
    use crate::widgets::{Cache, Widget};

    fn container() -> Container {
        let mut container = Container::new();
        container.install(&ServicesAssembly);
        container
    }

    #[test]
    fn accessors_resolve_registrations() {
        let container = container();
        assert_eq!(container.logger().log("hi"), "console: hi");
        assert_eq!(container.database_named(DatabaseKey::Primary).name, "primary");
        assert_eq!(container.database_named(DatabaseKey::ReadReplica).name, "replica");
        assert_eq!(container.database_named(DatabaseKey::Fake).name, "fake");
        assert_eq!(
            DatabaseKey::all_cases(),
            vec![DatabaseKey::Primary, DatabaseKey::ReadReplica, DatabaseKey::Fake]
        );
        assert_eq!(DatabaseKey::ReadReplica.to_string(), "read-replica");
        let plugins = container.plugin_collection();
        assert_eq!(plugins.len(), 1);
        assert_eq!(plugins[0].name(), "metrics");
    }

    #[test]
    fn factories_resolve_dependencies() {
        let container = container();

        let widget = Widget::make(&container, "title".to_string());
        assert_eq!(widget.db.name, "primary");
        assert_eq!(widget.label, "title");
        assert_eq!(widget.retries, 3);
        assert_eq!(widget.logger.log("w"), "console: w");

        let cache = Cache::<u32>::build(&container);
        assert!(cache.items.is_empty());
        assert_eq!(cache.logger.log("c"), "console: c");

        let gadget = Gadget::make(&container);
        assert_eq!(gadget.logger.log("g"), "console: g");
    }
}
