use std::any::{Any, TypeId};
use std::collections::HashMap;

type Factory = Box<dyn Fn(&Container) -> Box<dyn Any>>;

/// Minimal type-keyed container the generated code resolves through
#[derive(Default)]
pub struct Container {
    single: HashMap<TypeId, Factory>,
    named: HashMap<(TypeId, String), Factory>,
    collections: HashMap<TypeId, Vec<Factory>>,
}

fn erase<T: 'static>(factory: impl Fn(&Container) -> T + 'static) -> Factory {
    Box::new(move |container: &Container| Box::new(factory(container)) as Box<dyn Any>)
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install(&mut self, assembly: &impl Assembly) -> &mut Self {
        assembly.assemble(self);
        self
    }

    pub fn register<T: 'static>(&mut self, factory: impl Fn(&Container) -> T + 'static) -> &mut Self {
        self.single.insert(TypeId::of::<T>(), erase(factory));
        self
    }

    pub fn register_named<T: 'static>(
        &mut self,
        factory: impl Fn(&Container) -> T + 'static,
        name: &str,
    ) -> &mut Self {
        self.named.insert((TypeId::of::<T>(), name.to_string()), erase(factory));
        self
    }

    pub fn register_into_collection<T: 'static>(
        &mut self,
        factory: impl Fn(&Container) -> T + 'static,
    ) -> &mut Self {
        self.collections
            .entry(TypeId::of::<T>())
            .or_default()
            .push(erase(factory));
        self
    }

    fn build<T: 'static>(&self, factory: &Factory) -> Option<T> {
        factory(self).downcast::<T>().ok().map(|value| *value)
    }
}

pub trait Assembly {
    fn assemble(&self, container: &mut Container);
}

pub trait Resolver {
    fn resolve<T: 'static>(&self) -> Option<T>;
    fn resolve_named<T: 'static>(&self, name: &str) -> Option<T>;
    fn resolve_collection<T: 'static>(&self) -> Vec<T>;
}

impl Resolver for Container {
    fn resolve<T: 'static>(&self) -> Option<T> {
        let factory = self.single.get(&TypeId::of::<T>())?;
        self.build(factory)
    }

    fn resolve_named<T: 'static>(&self, name: &str) -> Option<T> {
        let factory = self.named.get(&(TypeId::of::<T>(), name.to_string()))?;
        self.build(factory)
    }

    fn resolve_collection<T: 'static>(&self) -> Vec<T> {
        self.collections
            .get(&TypeId::of::<T>())
            .into_iter()
            .flatten()
            .filter_map(|factory| self.build(factory))
            .collect()
    }
}
