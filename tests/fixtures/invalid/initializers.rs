pub struct Report;

impl Report {
    #[resolvable]
    pub async fn load(source: Source) -> Self {
        Report
    }

    #[resolvable]
    pub fn new(#[argument] #[named("x")] title: String) -> Self {
        Report
    }

    #[resolvable]
    pub fn empty() -> Self {
        Report
    }
}
