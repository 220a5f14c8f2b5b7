//! Photographs published with the magazine, as stored under the image root.

pub const KNOWN_IMAGES: &[&str] = &[
    "05_Elders_01_1.jpg",
    "05_Elders_01_2.jpg",
    "07_Elders_03_1.jpg",
    "12_Family_02_1.jpg",
    "12_Family_02_2.jpg",
    "13_Family_03_1.jpg",
    "14_Family_04_1.png",
    "59_Friends_01_1.jpg",
    "59_Friends_01_2.jpg",
    "61_Friends_03_1.jpg",
    "71_Recipes_01_1.jpg",
    "71_Recipes_01_2.jpg",
    "88_Colleagues_02_1.jpg",
    "88_Colleagues_02_2.JPG",
    "100_Afterword_01_1.jpg",
    "cover.jpg",
    "tony_portrait.png",
    "tony_workbench.jpg",
];
