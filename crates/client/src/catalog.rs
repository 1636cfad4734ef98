//! Built-in medicine catalog and the product listing filters.

use medicart_core::{Price, PriceBucket, Product, ProductId};

/// Listing filter. Every populated field must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Case-insensitive substring of the name or description.
    pub search: Option<String>,
    /// Exact category name.
    pub category: Option<String>,
    pub price: Option<PriceBucket>,
    /// Only prescription medicines.
    pub prescription_only: bool,
}

impl ProductFilter {
    /// Whether `product` passes every populated criterion.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        let matches_search = self.search.as_deref().is_none_or(|term| {
            let term = term.trim().to_lowercase();
            term.is_empty()
                || product.name.to_lowercase().contains(&term)
                || product.description.to_lowercase().contains(&term)
        });
        let matches_category = self
            .category
            .as_deref()
            .is_none_or(|category| product.category == category);
        let matches_price = self.price.is_none_or(|bucket| bucket.contains(product.price));
        let matches_prescription = !self.prescription_only || product.requires_prescription;

        matches_search && matches_category && matches_price && matches_prescription
    }
}

/// Read-only product catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    /// Catalog over an arbitrary product list.
    #[must_use]
    pub const fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// The nine medicines the store ships with.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(builtin_products())
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    /// Products in `category`, compared case-insensitively.
    #[must_use]
    pub fn by_category(&self, category: &str) -> Vec<&Product> {
        let category = category.to_lowercase();
        self.products
            .iter()
            .filter(|p| p.category.to_lowercase() == category)
            .collect()
    }

    /// Distinct categories in first-seen order.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for product in &self.products {
            if !seen.contains(&product.category.as_str()) {
                seen.push(&product.category);
            }
        }
        seen
    }

    /// Products whose name, description or category contains `query`,
    /// ignoring case.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&Product> {
        let term = query.to_lowercase();
        self.products
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&term)
                    || p.description.to_lowercase().contains(&term)
                    || p.category.to_lowercase().contains(&term)
            })
            .collect()
    }

    /// Products passing `filter`, in catalog order.
    #[must_use]
    pub fn filter(&self, filter: &ProductFilter) -> Vec<&Product> {
        self.products.iter().filter(|p| filter.matches(p)).collect()
    }
}

struct Medicine {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    cents: u32,
    photo: &'static str,
    category: &'static str,
    dosage: &'static str,
    brand: &'static str,
    requires_prescription: bool,
}

const MEDICINES: [Medicine; 9] = [
    Medicine {
        id: "1",
        name: "Ibuprofen 200mg",
        description: "Relieves pain and reduces inflammation. Commonly used for headaches, muscle aches, menstrual cramps, and other minor pain.",
        cents: 899,
        photo: "photo-1584308666744-24d5c474f2ae",
        category: "Pain Relief",
        dosage: "200mg",
        brand: "MediPharm",
        requires_prescription: false,
    },
    Medicine {
        id: "2",
        name: "Acetaminophen 500mg",
        description: "Reduces fever and relieves pain. Commonly used for headaches, muscle aches, arthritis, backache, toothaches, colds, and fevers.",
        cents: 749,
        photo: "photo-1550572017-a0589083a8c1",
        category: "Pain Relief",
        dosage: "500mg",
        brand: "HealthPlus",
        requires_prescription: false,
    },
    Medicine {
        id: "3",
        name: "Aspirin 325mg",
        description: "Reduces pain, fever, and inflammation. Also used to reduce the risk of heart attack and stroke.",
        cents: 699,
        photo: "photo-1587854692152-cbe660dbde88",
        category: "Pain Relief",
        dosage: "325mg",
        brand: "MediPharm",
        requires_prescription: false,
    },
    Medicine {
        id: "4",
        name: "Loratadine 10mg",
        description: "Antihistamine that reduces the effects of natural chemical histamine in the body. Used to treat sneezing, runny nose, and other allergy symptoms.",
        cents: 1299,
        photo: "photo-1631549916768-4119b4220984",
        category: "Allergy",
        dosage: "10mg",
        brand: "AllerCare",
        requires_prescription: false,
    },
    Medicine {
        id: "5",
        name: "Amoxicillin 500mg",
        description: "Antibiotic used to treat a wide variety of bacterial infections. Works by stopping the growth of bacteria.",
        cents: 1499,
        photo: "photo-1607619056574-7b8d3ee536b2",
        category: "Antibiotics",
        dosage: "500mg",
        brand: "MedCure",
        requires_prescription: true,
    },
    Medicine {
        id: "6",
        name: "Omeprazole 20mg",
        description: "Reduces the amount of acid in your stomach. Used to treat heartburn, a damaged esophagus, stomach ulcers, and gastroesophageal reflux disease.",
        cents: 1599,
        photo: "photo-1471864190281-a93a3070b6de",
        category: "Digestive Health",
        dosage: "20mg",
        brand: "GastroEase",
        requires_prescription: false,
    },
    Medicine {
        id: "7",
        name: "Cetirizine 10mg",
        description: "Antihistamine that reduces the effects of natural chemical histamine in the body. Used to treat hay fever and allergy symptoms.",
        cents: 1099,
        photo: "photo-1576073719676-aa95576db207",
        category: "Allergy",
        dosage: "10mg",
        brand: "AllerCare",
        requires_prescription: false,
    },
    Medicine {
        id: "8",
        name: "Simvastatin 20mg",
        description: "Lowers cholesterol and triglycerides in the blood. Used to reduce the risk of stroke, heart attack, and other heart complications.",
        cents: 1899,
        photo: "photo-1626716493137-b67fe178d2c6",
        category: "Cardiovascular",
        dosage: "20mg",
        brand: "CardioHealth",
        requires_prescription: true,
    },
    Medicine {
        id: "9",
        name: "Multivitamin Daily",
        description: "Provides essential vitamins and minerals to support overall health and well-being.",
        cents: 999,
        photo: "photo-1577174881658-0f30ed549adc",
        category: "Vitamins & Supplements",
        dosage: "Daily",
        brand: "VitaWell",
        requires_prescription: false,
    },
];

fn builtin_products() -> Vec<Product> {
    MEDICINES
        .iter()
        .map(|m| Product {
            id: ProductId::new(m.id),
            name: m.name.to_string(),
            description: m.description.to_string(),
            price: Price::from_cents(m.cents),
            image: format!(
                "https://images.unsplash.com/{}?ixlib=rb-1.2.1&auto=format&fit=crop&w=500&q=80",
                m.photo
            ),
            category: m.category.to_string(),
            in_stock: true,
            dosage: m.dosage.to_string(),
            brand: m.brand.to_string(),
            requires_prescription: m.requires_prescription,
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn names(products: &[&Product]) -> Vec<String> {
        products.iter().map(|p| p.name.clone()).collect()
    }

    #[test]
    fn test_builtin_catalog() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.products().len(), 9);
        let ibuprofen = catalog.product(&ProductId::new("1")).unwrap();
        assert_eq!(ibuprofen.name, "Ibuprofen 200mg");
        assert_eq!(ibuprofen.price.display(), "$8.99");
        assert!(catalog.product(&ProductId::new("42")).is_none());
    }

    #[test]
    fn test_categories_first_seen_order() {
        let catalog = Catalog::builtin();
        assert_eq!(
            catalog.categories(),
            vec![
                "Pain Relief",
                "Allergy",
                "Antibiotics",
                "Digestive Health",
                "Cardiovascular",
                "Vitamins & Supplements",
            ]
        );
    }

    #[test]
    fn test_by_category_ignores_case() {
        let catalog = Catalog::builtin();
        assert_eq!(
            names(&catalog.by_category("allergy")),
            vec!["Loratadine 10mg", "Cetirizine 10mg"]
        );
        assert!(catalog.by_category("Dermatology").is_empty());
    }

    #[test]
    fn test_search_covers_category() {
        let catalog = Catalog::builtin();
        // "vitamins" only appears in the category and description of one product
        assert_eq!(names(&catalog.search("VITAMINS")), vec!["Multivitamin Daily"]);
        assert_eq!(catalog.search("pain relief").len(), 3);
    }

    #[test]
    fn test_filter_price_buckets() {
        let catalog = Catalog::builtin();
        let under = ProductFilter {
            price: Some(PriceBucket::Under10),
            ..ProductFilter::default()
        };
        assert_eq!(catalog.filter(&under).len(), 4);

        let mid = ProductFilter {
            price: Some(PriceBucket::TenToFifteen),
            ..ProductFilter::default()
        };
        assert_eq!(
            names(&catalog.filter(&mid)),
            vec!["Loratadine 10mg", "Amoxicillin 500mg", "Cetirizine 10mg"]
        );

        let over = ProductFilter {
            price: Some(PriceBucket::Over15),
            ..ProductFilter::default()
        };
        assert_eq!(
            names(&catalog.filter(&over)),
            vec!["Omeprazole 20mg", "Simvastatin 20mg"]
        );
    }

    #[test]
    fn test_filter_combined() {
        let catalog = Catalog::builtin();
        let filter = ProductFilter {
            prescription_only: true,
            price: Some(PriceBucket::Over15),
            ..ProductFilter::default()
        };
        assert_eq!(names(&catalog.filter(&filter)), vec!["Simvastatin 20mg"]);

        let filter = ProductFilter {
            search: Some("Headaches".to_string()),
            category: Some("Pain Relief".to_string()),
            ..ProductFilter::default()
        };
        assert_eq!(
            names(&catalog.filter(&filter)),
            vec!["Ibuprofen 200mg", "Acetaminophen 500mg"]
        );
    }

    #[test]
    fn test_filter_category_is_exact() {
        let catalog = Catalog::builtin();
        let filter = ProductFilter {
            category: Some("allergy".to_string()),
            ..ProductFilter::default()
        };
        assert!(catalog.filter(&filter).is_empty());
    }
}
