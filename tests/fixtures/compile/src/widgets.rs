use std::sync::Arc;

use assemblygen_macros::resolvable;

use crate::model::{Database, Logger};

pub struct Widget {
    pub logger: Arc<dyn Logger>,
    pub db: Database,
    pub label: String,
    pub retries: u32,
}

impl Widget {
    #[resolvable]
    pub fn new(
        logger: Arc<dyn Logger>,
        #[named("primary")] db: Database,
        #[argument] label: String,
        #[use_default(3)] retries: u32,
    ) -> Self {
        Widget {
            logger,
            db,
            label,
            retries,
        }
    }
}

pub struct Cache<T> {
    pub items: Vec<T>,
    pub logger: Arc<dyn Logger>,
}

impl Cache<u32> {
    #[resolvable(name = "build")]
    pub(crate) fn with_logger(logger: Arc<dyn Logger>) -> Self {
        Cache {
            items: Vec::new(),
            logger,
        }
    }
}

pub mod inner {
    use std::sync::Arc;

    use crate::model::Logger;

    pub struct Gadget {
        pub logger: Arc<dyn Logger>,
    }

    impl Gadget {
        #[assemblygen_macros::resolvable]
        pub fn new(logger: Arc<dyn Logger>) -> Self {
            Gadget { logger }
        }
    }
}
