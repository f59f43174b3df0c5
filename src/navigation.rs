//! Top navigation links added to newly provisioned sites

use crate::site::{NavigationLocation, NavigationNode};

/// Title and root-relative path of each hub link, in display order
pub const HUB_LINKS: [(&str, &str); 6] = [
    ("SharePoint Main Menu", "/SitePages/Home.aspx"),
    ("Document Centre", "/Document%20Centre/SitePages/Home.aspx"),
    ("Project Centre", "/Project%20Centre/SitePages/Home.aspx"),
    ("WHS Centre", "/WHS%20Centre/"),
    ("Training Centre", "/Training%20Centre"),
    ("Proposal Hub", "/Proposal%20Hub"),
];

/// Build the top navigation nodes pointing back to the hub sites
pub fn top_navigation_links(root_site_url: &str) -> Vec<NavigationNode> {
    let root = root_site_url.trim().trim_end_matches('/');
    HUB_LINKS
        .iter()
        .map(|(title, path)| NavigationNode {
            title: (*title).to_string(),
            url: format!("{root}{path}"),
            location: NavigationLocation::TopNavigationBar,
        })
        .collect()
}
