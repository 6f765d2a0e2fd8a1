//! Title-based series and page resolution.
//!
//! Products carry a typed [`Category`], which is the authoritative
//! classification. These functions only exist for records that arrive
//! without one (free-text titles) and sniff the title instead.
//! Rules are checked in order and the first match wins, so more specific
//! tokens must come before the generic ones they contain.

use super::category::Category;
use super::product::Product;

/// Series label used when no rule matches.
pub const DEFAULT_SERIES: &str = "IFP50 Series";

/// Page used when no rule matches.
pub const DEFAULT_PATH: &str = "/products";

const SERIES_RULES: &[(&[&str], Category)] = &[
  (&["ops", "open pluggable"], Category::Ops),
  (&["tv stand", "tv-stand", "stand"], Category::TvStand),
  (&["meeting pod", "pod"], Category::MeetingPod),
  (&["portable panel", "panel"], Category::PortablePanel),
  (&["floor kiosk", "kiosk"], Category::FloorKiosk),
  (&["smarttvlts", "smart tv lts"], Category::SmartTvLts),
  (
    &["smartliftingtouchtable", "lifting touch table"],
    Category::SmartLiftingTouchTable,
  ),
  (&["smarttouchtable", "touch table"], Category::SmartTouchTable),
  // m86lb must be checked before the plain m86 rule
  (
    &["smartblackboardm86lb", "smart-blackboard-m86lb", "m86lb"],
    Category::SmartBlackboardM86Lb,
  ),
  (&["smartblackboardm86", "m86"], Category::SmartBlackboardM86),
  (&["iwbp82", "p-82"], Category::IwbP82),
  (&["iwbs82", "s-82"], Category::IwbS82),
  (&["adv100"], Category::Adv100),
  (&["t982"], Category::T982),
  (&["adv311d2"], Category::Adv311d2),
  (&["rk3588"], Category::Rk3588),
  (&["ifp62"], Category::Ifp62),
  (&["ifp52"], Category::Ifp52),
  (&["ifp51"], Category::Ifp51),
];

const PATH_RULES: &[(&str, Category)] = &[
  ("ifp50", Category::Ifp50),
  ("ifp51", Category::Ifp51),
  ("ifp52", Category::Ifp52),
  ("ifp62", Category::Ifp62),
  ("rk3588", Category::Rk3588),
  ("adv311d2", Category::Adv311d2),
  ("t982", Category::T982),
  ("adv100", Category::Adv100),
  ("iwbs82", Category::IwbS82),
  ("iwbp82", Category::IwbP82),
  ("smart-blackboard-m86lb", Category::SmartBlackboardM86Lb),
  ("smart-blackboard-m86", Category::SmartBlackboardM86),
  ("smart-touch-table", Category::SmartTouchTable),
  ("smart-lifting-touch-table", Category::SmartLiftingTouchTable),
  ("smart-tv-lts", Category::SmartTvLts),
  ("floor-kiosk", Category::FloorKiosk),
  ("portable-panel", Category::PortablePanel),
  ("meeting-pod", Category::MeetingPod),
  ("tv-stand", Category::TvStand),
  ("ops", Category::Ops),
];

/// Category whose series label a title resolves to, if any rule matches.
pub fn series_category(title: &str) -> Option<Category> {
  let title = title.to_lowercase();
  SERIES_RULES
    .iter()
    .find(|(tokens, _)| tokens.iter().any(|t| title.contains(t)))
    .map(|(_, category)| *category)
}

/// Series label for a product title.
pub fn product_series(title: &str) -> &'static str {
  series_category(title)
    .map(|c| c.series())
    .unwrap_or(DEFAULT_SERIES)
}

/// Category whose page a title links to, if any rule matches.
pub fn path_category(title: &str) -> Option<Category> {
  let title = title.to_lowercase();
  PATH_RULES
    .iter()
    .find(|(token, _)| title.contains(token))
    .map(|(_, category)| *category)
}

/// Navigation path for a product title.
pub fn product_path(title: &str) -> String {
  path_category(title)
    .map(|c| c.page_path())
    .unwrap_or_else(|| DEFAULT_PATH.to_string())
}

/// Group products by title-derived series, keeping first-seen series order.
pub fn group_by_series(products: Vec<Product>) -> Vec<(&'static str, Vec<Product>)> {
  let mut groups: Vec<(&'static str, Vec<Product>)> = Vec::new();

  for product in products {
    let series = product_series(&product.title);
    match groups.iter_mut().find(|(s, _)| *s == series) {
      Some((_, members)) => members.push(product),
      None => groups.push((series, vec![product])),
    }
  }

  groups
}
