use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use sha2::{Digest, Sha256};

/// Cache de memoização por identidade do upload (digest do conteúdo).
///
/// Uma entrada é computada no máximo uma vez por chave: o trabalho roda com o
/// guard adquirido, então leitores concorrentes da mesma chave esperam em vez
/// de recomputar.
pub struct ParseCache<T> {
    entries: Mutex<HashMap<[u8; 32], Arc<T>>>,
}

impl<T> ParseCache<T> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Devolve o resultado memoizado para estes bytes, computando-o na
    /// primeira vez.
    pub fn get_or_insert_with<F>(&self, content: &[u8], build: F) -> Arc<T>
    where
        F: FnOnce() -> T,
    {
        let key = digest(content);
        let mut entries = self.lock();
        if let Some(hit) = entries.get(&key) {
            return Arc::clone(hit);
        }
        let value = Arc::new(build());
        entries.insert(key, Arc::clone(&value));
        value
    }

    /// Variante falível: erros não são memoizados, a próxima chamada tenta de
    /// novo.
    pub fn get_or_try_insert_with<F, E>(&self, content: &[u8], build: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let key = digest(content);
        let mut entries = self.lock();
        if let Some(hit) = entries.get(&key) {
            return Ok(Arc::clone(hit));
        }
        let value = Arc::new(build()?);
        entries.insert(key, Arc::clone(&value));
        Ok(value)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<[u8; 32], Arc<T>>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<T> Default for ParseCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn digest(content: &[u8]) -> [u8; 32] {
    Sha256::digest(content).into()
}
