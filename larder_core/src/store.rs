//! Dataset persistence with file locking, and the write-time mutations
//! that keep the recipe graph acyclic.
//!
//! Everything the cost resolver and cycle detector need is loaded up
//! front into a `Dataset` snapshot; the algorithms themselves never
//! fetch anything. Mutations that add sub-recipe edges run the cycle
//! check first and replace the edge set as a single unit, so the stored
//! graph is never observably cyclic.

use crate::{cycle, Dataset, Error, IngredientEdge, Item, Recipe, Result, SubRecipeEdge};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use uuid::Uuid;

impl Dataset {
    /// Load a dataset from a file with shared locking.
    ///
    /// Returns an empty dataset if the file doesn't exist yet. A file
    /// that exists but cannot be read or parsed is an error - this is
    /// the source of truth, not a cache.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No dataset file found at {:?}, starting empty", path);
            return Ok(Self::default());
        }

        let file = File::open(path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        let read_result = reader.read_to_string(&mut contents);
        file.unlock()?;
        read_result?;

        let dataset: Dataset = serde_json::from_str(&contents)
            .map_err(|e| Error::Store(format!("failed to parse dataset {:?}: {}", path, e)))?;

        tracing::debug!(
            "Loaded dataset from {:?}: {} items, {} recipes",
            path,
            dataset.items.len(),
            dataset.recipes.len()
        );
        Ok(dataset)
    }

    /// Save the dataset to a file with exclusive locking.
    ///
    /// Atomically writes by:
    /// 1. Writing to a temp file in the same directory
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let temp = NamedTempFile::new_in(path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "dataset path missing parent")
        })?)?;

        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved dataset to {:?}", path);
        Ok(())
    }

    /// Insert or replace an item.
    pub fn upsert_item(&mut self, item: Item) {
        self.items.insert(item.id, item);
    }

    /// Update an item's latest price.
    pub fn set_latest_price(
        &mut self,
        item_id: Uuid,
        price: Decimal,
        at: DateTime<Utc>,
    ) -> Result<()> {
        if price < Decimal::ZERO {
            return Err(Error::Store(format!(
                "latest price must be non-negative, got {}",
                price
            )));
        }
        let item = self
            .items
            .get_mut(&item_id)
            .ok_or_else(|| Error::NotFound(format!("item {}", item_id)))?;
        item.latest_price = Some(price);
        item.price_updated_at = Some(at);
        Ok(())
    }

    /// Create a recipe, validating its edges before anything is stored.
    ///
    /// The cycle check runs against the graph as currently visible; if
    /// it passes, the recipe lands with all its edges in one insert.
    pub fn create_recipe(&mut self, recipe: Recipe) -> Result<()> {
        validate_quantities(&recipe.ingredients, &recipe.sub_recipes)?;

        let candidate_ids: Vec<Uuid> =
            recipe.sub_recipes.iter().map(|e| e.child_id).collect();
        if cycle::would_create_cycle(self, recipe.id, &candidate_ids) {
            return Err(Error::CycleDetected {
                recipe_id: recipe.id,
            });
        }

        self.recipes.insert(recipe.id, recipe);
        Ok(())
    }

    /// Replace a recipe's ingredient edges.
    pub fn set_ingredients(&mut self, recipe_id: Uuid, edges: Vec<IngredientEdge>) -> Result<()> {
        validate_quantities(&edges, &[])?;
        let recipe = self
            .recipes
            .get_mut(&recipe_id)
            .ok_or_else(|| Error::NotFound(format!("recipe {}", recipe_id)))?;
        recipe.ingredients = edges;
        Ok(())
    }

    /// Replace a recipe's sub-recipe edges.
    ///
    /// Runs the cycle check first; on success the whole edge set is
    /// swapped in a single assignment (all edges or none).
    pub fn set_sub_recipes(&mut self, recipe_id: Uuid, edges: Vec<SubRecipeEdge>) -> Result<()> {
        validate_quantities(&[], &edges)?;
        if !self.recipes.contains_key(&recipe_id) {
            return Err(Error::NotFound(format!("recipe {}", recipe_id)));
        }

        let candidate_ids: Vec<Uuid> = edges.iter().map(|e| e.child_id).collect();
        if cycle::would_create_cycle(self, recipe_id, &candidate_ids) {
            return Err(Error::CycleDetected { recipe_id });
        }

        // contains_key checked above
        if let Some(recipe) = self.recipes.get_mut(&recipe_id) {
            recipe.sub_recipes = edges;
        }
        Ok(())
    }

    /// Delete a recipe and any edges pointing at it.
    pub fn delete_recipe(&mut self, recipe_id: Uuid) -> Result<()> {
        if self.recipes.remove(&recipe_id).is_none() {
            return Err(Error::NotFound(format!("recipe {}", recipe_id)));
        }
        for recipe in self.recipes.values_mut() {
            recipe.sub_recipes.retain(|e| e.child_id != recipe_id);
        }
        for menu in self.menus.values_mut() {
            for segment in &mut menu.segments {
                segment.items.retain(|i| i.recipe_id != recipe_id);
            }
        }
        Ok(())
    }
}

fn validate_quantities(ingredients: &[IngredientEdge], sub_recipes: &[SubRecipeEdge]) -> Result<()> {
    for edge in ingredients {
        if edge.quantity <= Decimal::ZERO {
            return Err(Error::Store(format!(
                "ingredient quantity must be positive, got {}",
                edge.quantity
            )));
        }
    }
    for edge in sub_recipes {
        if edge.quantity <= Decimal::ZERO {
            return Err(Error::Store(format!(
                "sub-recipe quantity must be positive, got {}",
                edge.quantity
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::build_default_units;
    use rust_decimal_macros::dec;

    fn bare_recipe(name: &str) -> Recipe {
        Recipe {
            id: Uuid::new_v4(),
            name: name.into(),
            instructions: None,
            thumbnail: None,
            ingredients: vec![],
            sub_recipes: vec![],
        }
    }

    #[test]
    fn test_save_load_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("larder.json");

        let mut data = Dataset::default();
        data.registry = build_default_units();
        data.create_recipe(bare_recipe("bread")).unwrap();
        data.save(&path).unwrap();

        let loaded = Dataset::load(&path).unwrap();
        assert_eq!(loaded.recipes.len(), 1);
        assert_eq!(loaded.registry.units.len(), data.registry.units.len());
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let data = Dataset::load(&temp_dir.path().join("nope.json")).unwrap();
        assert!(data.recipes.is_empty());
    }

    #[test]
    fn test_load_corrupt_file_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("larder.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(Dataset::load(&path), Err(Error::Store(_))));
    }

    #[test]
    fn test_set_sub_recipes_rejects_cycle_without_mutating() {
        let mut data = Dataset::default();
        let b = bare_recipe("b");
        let b_id = b.id;
        let mut a = bare_recipe("a");
        a.sub_recipes = vec![SubRecipeEdge {
            child_id: b_id,
            quantity: dec!(1),
        }];
        let a_id = a.id;
        data.recipes.insert(b_id, b);
        data.recipes.insert(a_id, a);

        // b -> a would close the loop
        let result = data.set_sub_recipes(
            b_id,
            vec![SubRecipeEdge {
                child_id: a_id,
                quantity: dec!(1),
            }],
        );

        assert!(matches!(result, Err(Error::CycleDetected { .. })));
        assert!(data.recipes[&b_id].sub_recipes.is_empty());
    }

    #[test]
    fn test_create_recipe_rejects_self_reference() {
        let mut data = Dataset::default();
        let mut r = bare_recipe("ouroboros");
        r.sub_recipes = vec![SubRecipeEdge {
            child_id: r.id,
            quantity: dec!(1),
        }];

        assert!(matches!(
            data.create_recipe(r),
            Err(Error::CycleDetected { .. })
        ));
        assert!(data.recipes.is_empty());
    }

    #[test]
    fn test_quantity_must_be_positive() {
        let mut data = Dataset::default();
        let r = bare_recipe("r");
        let r_id = r.id;
        data.recipes.insert(r_id, r);

        let result = data.set_ingredients(
            r_id,
            vec![IngredientEdge {
                item_id: Uuid::new_v4(),
                quantity: dec!(0),
                unit_id: None,
            }],
        );
        assert!(matches!(result, Err(Error::Store(_))));
    }

    #[test]
    fn test_set_latest_price() {
        let mut data = Dataset::default();
        let item_id = Uuid::new_v4();
        data.upsert_item(Item {
            id: item_id,
            name: "flour".into(),
            ordering_unit_id: None,
            counting_unit_id: None,
            supplier: None,
            brand: None,
            group: None,
            latest_price: None,
            price_updated_at: None,
        });

        data.set_latest_price(item_id, dec!(4.20), Utc::now()).unwrap();
        assert_eq!(data.items[&item_id].latest_price, Some(dec!(4.20)));

        assert!(data
            .set_latest_price(item_id, dec!(-1), Utc::now())
            .is_err());
    }

    #[test]
    fn test_delete_recipe_prunes_edges() {
        let mut data = Dataset::default();
        let child = bare_recipe("child");
        let child_id = child.id;
        let mut parent = bare_recipe("parent");
        parent.sub_recipes = vec![SubRecipeEdge {
            child_id,
            quantity: dec!(1),
        }];
        let parent_id = parent.id;
        data.recipes.insert(child_id, child);
        data.recipes.insert(parent_id, parent);

        data.delete_recipe(child_id).unwrap();
        assert!(data.recipes[&parent_id].sub_recipes.is_empty());
    }
}
