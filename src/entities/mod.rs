//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

/// Animals
pub mod animal;
/// Disease catalogue
pub mod disease;
/// Medical history entries
pub mod medical_record;
/// Pet owners
pub mod owner;
/// Stored revenue reports
pub mod report;
/// Service price catalogue
pub mod service;
/// Login accounts
pub mod user;
/// Clinical visits
pub mod visit;
/// Ordered visit/service links
pub mod visit_service;

// Re-export specific types to avoid conflicts
pub use animal::{Column as AnimalColumn, Entity as Animal, Model as AnimalModel};
pub use disease::{Column as DiseaseColumn, Entity as Disease, Model as DiseaseModel};
pub use medical_record::{
    Column as MedicalRecordColumn, Entity as MedicalRecord, Model as MedicalRecordModel,
};
pub use owner::{Column as OwnerColumn, Entity as Owner, Model as OwnerModel};
pub use report::{Column as ReportColumn, Entity as Report, Model as ReportModel};
pub use service::{Column as ServiceColumn, Entity as Service, Model as ServiceModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel, Role};
pub use visit::{Column as VisitColumn, Entity as Visit, Model as VisitModel, VisitStatus};
pub use visit_service::{
    Column as VisitServiceColumn, Entity as VisitService, Model as VisitServiceModel,
};
