//! # ResourceStore
//! src/store/resource_store.rs
//!
//! Almacén en memoria compartido por todas las conexiones.
//!
//! ## IDs posicionales
//!
//! El ID de un item es su índice actual. Borrar el item `i` corre una
//! posición hacia abajo a todos los items posteriores: el ID `i + 1` pasa a
//! ser `i`, y así sucesivamente. Un ID no identifica a un item de forma estable.
//!
//! ```text
//! [A, B, C]  --DELETE 0-->  [B, C]     (B ahora es el ID 0)
//! ```
//!
//! Cada operación toma el lock una sola vez, así que es atómica respecto
//! de las demás conexiones.

use parking_lot::Mutex;
use serde_json::Value;

/// Valor arbitrario enviado por un cliente
pub type StoredItem = Value;

/// Colección ordenada e indexada por posición
#[derive(Debug, Default)]
pub struct ResourceStore {
    items: Mutex<Vec<StoredItem>>,
}

impl ResourceStore {
    /// Crea un almacén vacío
    pub fn new() -> Self {
        Self::default()
    }

    /// Agrega un item al final y retorna su ID (la posición en que quedó)
    ///
    /// # Ejemplo
    /// ```
    /// use crud_http_server::store::ResourceStore;
    /// use serde_json::json;
    ///
    /// let store = ResourceStore::new();
    /// assert_eq!(store.append(json!({"name": "a"})), 0);
    /// assert_eq!(store.append(json!({"name": "b"})), 1);
    /// ```
    pub fn append(&self, item: StoredItem) -> usize {
        let mut items = self.items.lock();
        items.push(item);
        items.len() - 1
    }

    /// Copia del item en la posición `index`
    pub fn get(&self, index: usize) -> Option<StoredItem> {
        self.items.lock().get(index).cloned()
    }

    /// Reemplaza el item en `index` sin moverlo de posición
    ///
    /// Retorna el valor anterior, o `None` si el índice está fuera de rango
    /// (en ese caso el almacén no cambia).
    pub fn replace(&self, index: usize, item: StoredItem) -> Option<StoredItem> {
        let mut items = self.items.lock();
        items
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, item))
    }

    /// Elimina el item en `index`, corriendo los posteriores una posición
    ///
    /// # Ejemplo
    /// ```
    /// use crud_http_server::store::ResourceStore;
    /// use serde_json::json;
    ///
    /// let store = ResourceStore::new();
    /// store.append(json!({"id": "A"}));
    /// store.append(json!({"id": "B"}));
    ///
    /// assert_eq!(store.remove(0), Some(json!({"id": "A"})));
    /// assert_eq!(store.get(0), Some(json!({"id": "B"})));
    /// ```
    pub fn remove(&self, index: usize) -> Option<StoredItem> {
        let mut items = self.items.lock();
        if index < items.len() {
            Some(items.remove(index))
        } else {
            None
        }
    }

    /// Cantidad actual de items
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// Copia de todo el contenido, en orden
    pub fn snapshot(&self) -> Vec<StoredItem> {
        self.items.lock().clone()
    }

    /// Serializa todo el almacén como arreglo JSON indentado (2 espacios)
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        let items = self.items.lock();
        serde_json::to_string_pretty(&*items)
    }
}
