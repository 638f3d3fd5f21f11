pub struct CoreAssembly;

impl Assembly for CoreAssembly {
    fn assemble(&self, container: &mut Container) {
        container.register_named::<Database>(|_| Database::connect("a"), "primary");
        container.register_named::<Database>(|_| Database::connect("b"), "primary");
        container.register::<Clock>(|_| Clock::system());
    }
}
