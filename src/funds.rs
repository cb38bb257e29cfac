/// Tracked specialist funds and their SEC CIK numbers, in roster order.
pub static FUNDS: &[(&str, &str)] = &[
    ("Boxer Capital Management, LLC", "0002018299"),
    ("Checkpoint Capital", "0001977548"),
    ("Caligan Partners LP", "0001727492"),
    ("Octagon Capital Advisors LP", "0001839435"),
    ("Perceptive Advisors LLC", "0001224962"),
    ("Exome Asset Management LLC", "0002011932"),
    ("Avoro Capital Advisors LLC", "0001633313"),
    ("Affinity Asset Advisors, LLC", "0001773195"),
    ("ADAR1 Capital Management, LLC", "0001940272"),
    ("Saturn V Capital Management LP", "0001964437"),
    ("Greatpoint Partners", "0001281446"),
    ("Vestal Point Capital, LP", "0001974915"),
    ("RTW Investments, LP", "0001493215"),
    ("Soleus Capital Management, L.P.", "0001802630"),
    ("Ally Bridge Group (NY) LLC", "0001822947"),
    ("Ikarian Capital, LLC", "0001778253"),
    ("RA Capital Management, L.P.", "0001346824"),
    ("Stonepine Capital Management", "0001440771"),
    ("Cormorant Asset Management LP", "0001583977"),
    ("DAFNA Capital Management LLC", "0001389933"),
    ("Paradigm Biocapital Advisors LP", "0001855655"),
    ("Rosalind Advisors", "0001622627"),
    ("Orbimed Advisors LLC", "0001055951"),
    ("Darwin Global Management", "0001839209"),
    ("Baker Bros Advisors", "0001263508"),
    ("TCG Crossover Management, LLC", "0001839948"),
    ("Acuta Capital Partners", "0001582844"),
    ("Artia Global Partners", "0001937964"),
    ("BVF Inc", "0001056807"),
    ("Commodore Capital", "0001831942"),
    ("Deep Track Capital", "0001856083"),
    ("Deerfield Management", "0001009258"),
    ("Logos Capital", "0001792126"),
    ("BioImpact Capital", "0001687078"),
    ("OpalEye Management", "0001595855"),
    ("Tang Capital Management", "0001232621"),
    ("Eagle Health Investments LP", "0001842545"),
    ("Versant Venture Management, LLC", "0001560009"),
    ("Squadron Capital Management LLC", "0002050709"),
    ("Stempoint Capital LP", "0001952142"),
];

pub fn lookup(fund_name: &str) -> Option<&'static str> {
    FUNDS
        .iter()
        .find(|(name, _)| *name == fund_name)
        .map(|(_, cik)| *cik)
}
