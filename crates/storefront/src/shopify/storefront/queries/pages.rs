//! Online-store pages.

use serde::{Deserialize, Serialize};

use super::SeoNode;

const GET_PAGE: &str = "query GetPage($handle: String!) {
  page(handle: $handle) {
    id
    title
    body
    seo { title description }
  }
}";

storefront_operation! {
    GetPage {
        operation: "GetPage",
        document: GET_PAGE,
        variables: GetPageVariables,
        response: GetPageData,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GetPageVariables {
    pub handle: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetPageData {
    pub page: Option<PageNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageNode {
    pub id: String,
    pub title: String,
    pub body: String,
    pub seo: Option<SeoNode>,
}
