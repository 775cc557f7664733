use url::Url;

use crate::ports::LockUrlGenerator;

/// Builds `<base_url>/lock?id=<key>` references to held project locks.
pub struct DefaultLockUrlGenerator {
    base_url: Url,
}

impl DefaultLockUrlGenerator {
    pub fn new(base_url: Url) -> Self {
        DefaultLockUrlGenerator { base_url }
    }
}

impl LockUrlGenerator for DefaultLockUrlGenerator {
    fn generate_lock_url(&self, lock_key: &str) -> String {
        let mut url = self.base_url.clone();
        url.set_path("lock");
        url.query_pairs_mut().clear().append_pair("id", lock_key);
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_key_is_percent_encoded() {
        let generator =
            DefaultLockUrlGenerator::new(Url::parse("https://groundwork.example.com").unwrap());
        let url = generator.generate_lock_url("octo/infra/modules/vpc/default");
        assert_eq!(
            url,
            "https://groundwork.example.com/lock?id=octo%2Finfra%2Fmodules%2Fvpc%2Fdefault"
        );
    }
}
