// Link touched applicants and products to the reference tables.
//
// Each pass is independent: it queries one matcher index and writes one link
// table. A link write that fails is reported and the pass continues. A pass
// stops early once the cancel token is set; its outcome then counts only the
// rows it got through.

use std::collections::BTreeMap;

use log::{debug, info, warn};
use rusqlite::Connection;

use orangebook_feed::{ApplicantRecord, ProductRecord};
use orangebook_resolve::matcher::split_ingredients;
use orangebook_resolve::model::{IngredientSubstance, MarketingCategory, Organization};
use orangebook_resolve::{
    CategoryIndex, NameNormalizer, OrganizationIndex, ResolveConfig, SubstanceIndex,
};
use orangebook_store::repository::{
    link_applicant_organization, link_product_marketing_category, link_product_substance,
    load_marketing_categories, load_organizations, load_substances,
};
use orangebook_store::StoreError;

use crate::cancel::CancelToken;
use crate::result::PassOutcome;

pub struct EntityResolver {
    organizations: OrganizationIndex,
    substances: SubstanceIndex,
    categories: CategoryIndex,
}

impl EntityResolver {
    pub fn new(
        organizations: &[Organization],
        substances: &[IngredientSubstance],
        categories: &[MarketingCategory],
        config: &ResolveConfig,
    ) -> Self {
        Self {
            organizations: OrganizationIndex::new(
                organizations,
                NameNormalizer::new(config),
                config.threshold,
            ),
            substances: SubstanceIndex::new(substances),
            categories: CategoryIndex::new(categories),
        }
    }

    /// Read all three reference tables and build the matchers.
    pub fn load(conn: &Connection, config: &ResolveConfig) -> Result<Self, StoreError> {
        let organizations = load_organizations(conn)?;
        let substances = load_substances(conn)?;
        let categories = load_marketing_categories(conn)?;
        info!(
            "reference data: {} organizations, {} substances, {} marketing categories",
            organizations.len(),
            substances.len(),
            categories.len()
        );
        Ok(Self::new(&organizations, &substances, &categories, config))
    }

    pub fn resolve_organizations(
        &self,
        conn: &Connection,
        applicants: &BTreeMap<i64, ApplicantRecord>,
        cancel: &CancelToken,
        errors: &mut Vec<String>,
    ) -> PassOutcome {
        let mut outcome = PassOutcome::default();
        for (&applicant_id, applicant) in applicants {
            if cancel.is_cancelled() {
                break;
            }
            let Some(m) = self
                .organizations
                .resolve(&applicant.short_name, &applicant.full_name)
            else {
                debug!("applicant '{}': no organization", applicant.short_name);
                outcome.unmatched += 1;
                continue;
            };
            match link_applicant_organization(conn, applicant_id, &m) {
                Ok(true) => outcome.created += 1,
                Ok(false) => {}
                Err(e) => link_failed(errors, "applicant", &applicant.short_name, e),
            }
        }
        outcome
    }

    /// Every `;`-separated component is resolved on its own and counts on its own.
    pub fn resolve_ingredients(
        &self,
        conn: &Connection,
        products: &BTreeMap<i64, ProductRecord>,
        cancel: &CancelToken,
        errors: &mut Vec<String>,
    ) -> PassOutcome {
        let mut outcome = PassOutcome::default();
        for (&product_id, product) in products {
            if cancel.is_cancelled() {
                break;
            }
            for component in split_ingredients(&product.ingredient) {
                let Some(m) = self.substances.resolve(&component) else {
                    debug!("ingredient '{component}': no substance");
                    outcome.unmatched += 1;
                    continue;
                };
                match link_product_substance(conn, product_id, &m) {
                    Ok(true) => outcome.created += 1,
                    Ok(false) => {}
                    Err(e) => link_failed(errors, "ingredient", &component, e),
                }
            }
        }
        outcome
    }

    pub fn resolve_categories(
        &self,
        conn: &Connection,
        products: &BTreeMap<i64, ProductRecord>,
        cancel: &CancelToken,
        errors: &mut Vec<String>,
    ) -> PassOutcome {
        let mut outcome = PassOutcome::default();
        for (&product_id, product) in products {
            if cancel.is_cancelled() {
                break;
            }
            let Some(m) = self
                .categories
                .resolve(&product.appl_type_prefix, &product.appl_no)
            else {
                debug!("product {}: no marketing category", product.application_key());
                outcome.unmatched += 1;
                continue;
            };
            match link_product_marketing_category(conn, product_id, &m) {
                Ok(true) => outcome.created += 1,
                Ok(false) => {}
                Err(e) => link_failed(errors, "product", &product.application_key(), e),
            }
        }
        outcome
    }
}

fn link_failed(errors: &mut Vec<String>, what: &str, name: &str, e: StoreError) {
    warn!("{what} '{name}': link not written: {e}");
    errors.push(format!("{what} '{name}': {e}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use orangebook_store::repository::upsert_product;
    use orangebook_store::{Store, Table};

    fn product(ingredient: &str, appl_type: &str, appl_no: &str) -> ProductRecord {
        ProductRecord {
            ingredient: ingredient.into(),
            dosage_form: None,
            route: None,
            trade_name: "TRADE".into(),
            strength: "1MG".into(),
            appl_type: appl_type.into(),
            appl_type_prefix: orangebook_feed::fields::map_appl_type_to_prefix(appl_type),
            appl_no: appl_no.into(),
            product_no: "001".into(),
            te_code: None,
            approval_date: None,
            approval_date_is_premarket: false,
            is_rld: false,
            is_rs: false,
            product_type: "RX".into(),
            applicant_short_name: String::new(),
            applicant_full_name: String::new(),
        }
    }

    fn seeded_store() -> Store {
        let store = Store::open_in_memory().unwrap();
        store
            .conn()
            .execute_batch(
                "INSERT INTO ingredient_substances (id, name) VALUES
                    (1, 'ACETAMINOPHEN'), (2, 'CODEINE PHOSPHATE');
                 INSERT INTO marketing_categories (id, application_id) VALUES
                    (1, 'NDA205613'), (2, '089000');",
            )
            .unwrap();
        store
    }

    fn touched_products(
        store: &Store,
        products: Vec<ProductRecord>,
    ) -> BTreeMap<i64, ProductRecord> {
        products
            .into_iter()
            .map(|p| {
                let (id, _) = upsert_product(store.conn(), &p, None).unwrap();
                (id, p)
            })
            .collect()
    }

    #[test]
    fn ingredient_components_resolve_independently() {
        let store = seeded_store();
        let resolver = EntityResolver::load(store.conn(), &ResolveConfig::default()).unwrap();
        let products = touched_products(
            &store,
            vec![product("ACETAMINOPHEN; CODEINE PHOSPHATE; UNOBTAINIUM", "A", "040779")],
        );

        let cancel = CancelToken::new();
        let mut errors = Vec::new();
        let outcome = resolver.resolve_ingredients(store.conn(), &products, &cancel, &mut errors);
        assert_eq!(outcome, PassOutcome { created: 2, unmatched: 1 });
        assert!(errors.is_empty());

        // Second pass finds the same links and writes nothing
        let again = resolver.resolve_ingredients(store.conn(), &products, &cancel, &mut errors);
        assert_eq!(again, PassOutcome { created: 0, unmatched: 1 });
        assert_eq!(store.count(Table::ProductIngredientSubstanceLinks).unwrap(), 2);
    }

    #[test]
    fn categories_exact_and_numeric() {
        let store = seeded_store();
        let resolver = EntityResolver::load(store.conn(), &ResolveConfig::default()).unwrap();
        let products = touched_products(
            &store,
            vec![
                product("ACETAMINOPHEN", "N", "205613"),
                product("ACETAMINOPHEN", "A", "089000"),
                product("ACETAMINOPHEN", "A", "111111"),
            ],
        );

        let mut errors = Vec::new();
        let cancel = CancelToken::new();
        let outcome = resolver.resolve_categories(store.conn(), &products, &cancel, &mut errors);
        assert_eq!(outcome, PassOutcome { created: 2, unmatched: 1 });
    }

    #[test]
    fn cancelled_pass_writes_nothing() {
        let store = seeded_store();
        let resolver = EntityResolver::load(store.conn(), &ResolveConfig::default()).unwrap();
        let products = touched_products(
            &store,
            vec![
                product("ACETAMINOPHEN", "N", "205613"),
                product("ACETAMINOPHEN", "A", "089000"),
            ],
        );
        let cancel = CancelToken::new();
        cancel.cancel();

        let mut errors = Vec::new();
        let ingredients =
            resolver.resolve_ingredients(store.conn(), &products, &cancel, &mut errors);
        let categories =
            resolver.resolve_categories(store.conn(), &products, &cancel, &mut errors);
        assert_eq!(ingredients, PassOutcome::default());
        assert_eq!(categories, PassOutcome::default());
        assert_eq!(store.count(Table::ProductIngredientSubstanceLinks).unwrap(), 0);
        assert_eq!(store.count(Table::ProductMarketingCategoryLinks).unwrap(), 0);
    }

    #[test]
    fn organizations_empty_reference_table() {
        let store = seeded_store();
        let resolver = EntityResolver::load(store.conn(), &ResolveConfig::default()).unwrap();
        let applicants = BTreeMap::from([(
            1,
            ApplicantRecord {
                short_name: "SALIX".into(),
                full_name: "SALIX PHARMACEUTICALS INC".into(),
            },
        )]);
        let mut errors = Vec::new();
        let cancel = CancelToken::new();
        let outcome =
            resolver.resolve_organizations(store.conn(), &applicants, &cancel, &mut errors);
        assert_eq!(outcome, PassOutcome { created: 0, unmatched: 1 });
    }
}
