use std::sync::Arc;

pub struct Widget {
    logger: Arc<dyn Logger>,
    db: Database,
    label: String,
    retries: u32,
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
