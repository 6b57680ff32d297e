use crate::error::{Error, Result};
use crate::provider::{FakeDataProvider, Locale};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// 内置目录
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    /// 书店: 书名与出版社独立抽样
    Bookstore,
    /// 电商: 先抽品类, 再在品类内抽商品
    Ecommerce,
}

impl CatalogKind {
    /// 客户与作者姓名默认使用的语言区域
    pub fn default_locale(self) -> Locale {
        match self {
            CatalogKind::Bookstore => Locale::En,
            CatalogKind::Ecommerce => Locale::PtBr,
        }
    }
}

/// 可售商品目录
#[derive(Debug, Clone)]
pub enum Catalog {
    /// 商品与分组各自独立抽样
    Independent {
        items: Vec<String>,
        groups: Vec<String>,
        attributes: Option<ItemAttributes>,
    },
    /// 分组 -> 商品列表, 分组与商品联合抽样
    Grouped { groups: Vec<(String, Vec<String>)> },
}

/// 独立目录的附加属性: 每个商品一个唯一编号, 以及可选的作者池 (与商品数同样大)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemAttributes {
    pub id_range: Range<u32>,
    pub authors: bool,
}

/// 一个批次内固定不变的附加值
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogDetails {
    /// 与 `items` 下标一一对应
    item_ids: Vec<u32>,
    authors: Vec<String>,
}

impl CatalogDetails {
    pub fn item_ids(&self) -> &[u32] {
        &self.item_ids
    }

    pub fn authors(&self) -> &[String] {
        &self.authors
    }
}

/// 一次目录抽样的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogPick {
    pub item: String,
    pub group: String,
    pub item_id: Option<u32>,
    pub author: Option<String>,
}

const BOOK_IDS: Range<u32> = 1001..2000;

const BOOKS: [&str; 20] = [
    "Competing on Analytics",
    "Data Science for Business",
    "The Data Warehouse Toolkit",
    "Analytics at Work",
    "Naked Statistics",
    "Data-Driven",
    "Winning with Data",
    "Big Data: A Revolution",
    "Data Smart",
    "The Analytics Edge",
    "Storytelling with Data",
    "The Art of Data Science",
    "Lean Analytics",
    "Data Strategy",
    "Predictive Analytics",
    "Data Science for Executives",
    "Monetizing Data",
    "The Data Detective",
    "Analytics in a Big Data World",
    "Data Science for Business Leaders",
];

const PUBLISHERS: [&str; 20] = [
    "Harvard Business Review Press",
    "O'Reilly Media",
    "Wiley",
    "Harvard Business Review Press",
    "W.W. Norton & Company",
    "O'Reilly Media",
    "Wiley",
    "Eamon Dolan/Houghton Mifflin Harcourt",
    "Wiley",
    "MIT Press",
    "Wiley",
    "O'Reilly Media",
    "O'Reilly Media",
    "Kogan Page",
    "Wiley",
    "Columbia Business School Publishing",
    "Harvard Business Review Press",
    "Penguin Books",
    "Wiley",
    "O'Reilly Media",
];

const CATEGORIES: [(&str, [&str; 7]); 15] = [
    ("Electronics", ["Smartphone X", "Tablet Y", "Bluetooth Earbuds", "4K TV", "Smartwatch", "Turbo Charger", "Bluetooth Speaker"]),
    ("Computers", ["Ultra Notebook", "Gaming PC", "Curved Monitor", "Mechanical Keyboard", "RGB Mouse", "Full HD Webcam", "1TB SSD"]),
    ("Clothing", ["Dry Fit T-Shirt", "Denim Jacket", "Running Shoes", "Casual Dress", "Sports Cap", "Casual Backpack", "Sunglasses"]),
    ("Books", ["Python for Beginners", "Advanced Data Science", "The Power of Habit", "1984", "Mindset", "Clean Code", "The Art of War"]),
    ("Beauty", ["Elegance Perfume", "Skincare Kit", "Matte Lipstick", "Organic Shampoo", "Face Mask", "Liquid Foundation", "Sunscreen"]),
    ("Automotive", ["17-inch Tire", "Synthetic Oil", "Rear Camera", "Phone Mount", "Seat Cover", "Tool Kit", "LED Headlight"]),
    ("Toys", ["RC Car", "Fashion Doll", "Creative Lego", "1000-piece Puzzle", "Educational Game", "Kitchen Playset", "Vinyl Ball"]),
    ("Sports", ["Soccer Ball", "Tennis Racket", "Jump Rope", "Sports Backpack", "Dumbbell Kit", "Road Bike", "Boxing Gloves"]),
    ("Furniture", ["Recliner Sofa", "Dining Table", "Gaming Chair", "6-door Wardrobe", "Queen Box Bed", "Bookshelf", "Office Desk"]),
    ("Appliances", ["Frost Free Fridge", "Steel Microwave", "Washing Machine", "Vacuum Cleaner", "5-burner Stove", "Coffee Maker", "Blender"]),
    ("Tools", ["Power Drill", "Screwdriver", "Circular Saw", "Heavy Hammer", "Digital Tape Measure", "Universal Pliers", "Drill Bit Kit"]),
    ("Petshop", ["Premium Pet Food", "Adjustable Collar", "Interactive Toy", "Dog Bed", "Cat Litter", "Pet Shampoo", "Cat Scratcher"]),
    ("Perfumery", ["Roll-on Deodorant", "Body Lotion", "Anti-dandruff Shampoo", "Liquid Soap", "Hair Oil", "Nourishing Conditioner", "Hand Cream"]),
    ("Stationery", ["College Notebook", "Ballpoint Pen", "Permanent Marker", "A4 Paper", "Daily Planner", "Stapler", "Pencil Case"]),
    ("Games", ["NextGen Console", "Wireless Controller", "RGB Gaming Keyboard", "Surround Headset", "Pro Gaming Chair", "XL Mousepad", "PSN Gift Card"]),
];

impl Catalog {
    pub fn builtin(kind: CatalogKind) -> Self {
        match kind {
            CatalogKind::Bookstore => Self::bookstore(),
            CatalogKind::Ecommerce => Self::ecommerce(),
        }
    }

    pub fn bookstore() -> Self {
        Catalog::Independent {
            items: BOOKS.iter().map(|s| s.to_string()).collect(),
            groups: PUBLISHERS.iter().map(|s| s.to_string()).collect(),
            attributes: Some(ItemAttributes {
                id_range: BOOK_IDS,
                authors: true,
            }),
        }
    }

    pub fn ecommerce() -> Self {
        Catalog::Grouped {
            groups: CATEGORIES
                .iter()
                .map(|(category, products)| {
                    (category.to_string(), products.iter().map(|p| p.to_string()).collect())
                })
                .collect(),
        }
    }

    /// 为一个批次生成附加值: 无放回抽样商品编号, 按语言区域生成作者全名
    pub fn details(&self, provider: &mut dyn FakeDataProvider, locale: Locale) -> Result<CatalogDetails> {
        let Catalog::Independent {
            items,
            attributes: Some(attributes),
            ..
        } = self
        else {
            return Ok(CatalogDetails::default());
        };

        let item_ids = provider.unique_sample(attributes.id_range.clone(), items.len())?;
        let authors = if attributes.authors {
            (0..items.len()).map(|_| provider.full_name(locale)).collect()
        } else {
            Vec::new()
        };
        Ok(CatalogDetails { item_ids, authors })
    }

    /// 抽样一个商品及其分组
    pub fn sample(&self, details: &CatalogDetails, provider: &mut dyn FakeDataProvider) -> Result<CatalogPick> {
        match self {
            Catalog::Independent { items, groups, .. } => {
                let idx = provider.pick(items.len())?;
                let group = &groups[provider.pick(groups.len())?];
                let author = match details.authors.len() {
                    0 => None,
                    len => Some(details.authors[provider.pick(len)?].clone()),
                };
                Ok(CatalogPick {
                    item: items[idx].clone(),
                    group: group.clone(),
                    item_id: details.item_ids.get(idx).copied(),
                    author,
                })
            }
            Catalog::Grouped { groups } => {
                let (group, items) = &groups[provider.pick(groups.len())?];
                let item = &items[provider.pick(items.len())?];
                Ok(CatalogPick {
                    item: item.clone(),
                    group: group.clone(),
                    item_id: None,
                    author: None,
                })
            }
        }
    }

    /// 分组所属的商品; 独立目录不存在这种关系, 返回 None
    pub fn items_of(&self, group: &str) -> Option<&[String]> {
        match self {
            Catalog::Independent { .. } => None,
            Catalog::Grouped { groups } => groups
                .iter()
                .find(|(g, _)| g == group)
                .map(|(_, items)| items.as_slice()),
        }
    }

    /// 目录中没有可抽样的商品时返回错误
    pub fn ensure_sampleable(&self) -> Result<()> {
        let empty = match self {
            Catalog::Independent { items, groups, .. } => items.is_empty() || groups.is_empty(),
            Catalog::Grouped { groups } => {
                groups.is_empty() || groups.iter().any(|(_, items)| items.is_empty())
            }
        };
        if empty {
            return Err(Error::EmptyInput("catalog"));
        }
        Ok(())
    }
}
