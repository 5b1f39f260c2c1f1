//! GraphQL documents understood by the book service.

/// A named GraphQL document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Operation {
    pub name: &'static str,
    pub document: &'static str,
}

// ============================================================================
// Reads
// ============================================================================

pub const GET_USER: Operation = Operation {
    name: "GetUser",
    document: r"query GetUser($id: ID!) {
  user(id: $id) {
    id
    username
    bio
    birthDate
    nationality
  }
}",
};

pub const GET_USERS: Operation = Operation {
    name: "GetUsers",
    document: r"query GetUsers {
  users {
    id
    username
    bio
    birthDate
    nationality
  }
}",
};

pub const GET_BOOKS: Operation = Operation {
    name: "GetBooks",
    document: r"query GetBooks {
  books {
    id
    title
    description
    publishYear
    authorId
    categories
  }
}",
};

pub const GET_BOOK: Operation = Operation {
    name: "GetBook",
    document: r"query GetBook($id: ID!) {
  book(id: $id) {
    id
    title
    description
    publishYear
    authorId
    categories
  }
}",
};

pub const REVIEWS_BY_BOOK: Operation = Operation {
    name: "ReviewsByBook",
    document: r"query ReviewsByBook($bookId: ID!) {
  reviewsByBook(bookId: $bookId) {
    id
    bookId
    userId
    rating
    comment
    createdAt
  }
}",
};

pub const GET_CATEGORIES: Operation = Operation {
    name: "GetCategories",
    document: r"query GetCategories {
  categories {
    id
    title
    description
    icon
    parentCategoryId
  }
}",
};

// ============================================================================
// Writes
// ============================================================================

pub const REGISTER_USER: Operation = Operation {
    name: "RegisterUser",
    document: r"mutation RegisterUser($input: RegisterUserInput!) {
  registerUser(input: $input) {
    user {
      id
      username
      bio
      birthDate
      nationality
    }
    token
  }
}",
};

pub const LOGIN_USER: Operation = Operation {
    name: "LoginUser",
    document: r"mutation LoginUser($input: LoginUserInput!) {
  loginUser(input: $input) {
    user {
      id
      username
      bio
      birthDate
      nationality
    }
    token
  }
}",
};

pub const CREATE_CATEGORY: Operation = Operation {
    name: "CreateCategory",
    document: r"mutation CreateCategory($input: CreateCategoryInput!) {
  createCategory(input: $input) {
    id
    title
    description
    icon
    parentCategoryId
  }
}",
};

pub const CREATE_BOOK: Operation = Operation {
    name: "CreateBook",
    document: r"mutation CreateBook($input: BookInput!) {
  createBook(input: $input) {
    id
    title
    description
    publishYear
    authorId
    categories
  }
}",
};

pub const UPDATE_BOOK: Operation = Operation {
    name: "UpdateBook",
    document: r"mutation UpdateBook($id: ID!, $input: BookInput!) {
  updateBook(id: $id, input: $input) {
    id
    title
    description
    publishYear
    authorId
    categories
  }
}",
};

pub const DELETE_BOOK: Operation = Operation {
    name: "DeleteBook",
    document: r"mutation DeleteBook($id: ID!) {
  deleteBook(id: $id)
}",
};

pub const CREATE_REVIEW: Operation = Operation {
    name: "CreateReview",
    document: r"mutation CreateReview($input: CreateReviewInput!) {
  createReview(input: $input) {
    id
    bookId
    userId
    rating
    comment
    createdAt
  }
}",
};

pub const DELETE_REVIEW: Operation = Operation {
    name: "DeleteReview",
    document: r"mutation DeleteReview($id: ID!) {
  deleteReview(id: $id)
}",
};
